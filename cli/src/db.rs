use anyhow::{anyhow, Context, Result};
use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub fn connect(database_url: Option<&str>) -> Result<PgConnection> {
    let url = database_url.context("DATABASE_URL must be set (or pass --database-url)")?;
    PgConnection::establish(url).context("Failed to connect to the database")
}

/// Returns the number of migrations applied.
pub fn run_migrations(conn: &mut PgConnection) -> Result<usize> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    for version in &applied {
        tracing::info!(%version, "migration applied");
    }
    Ok(applied.len())
}
