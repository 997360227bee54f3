mod admin;
mod db;
mod ingredients;
mod schema;
mod tags;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "foodgram")]
#[command(about = "Foodgram database administration", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Bulk load ingredients from a CSV or JSON file
    LoadIngredients {
        /// Two-column CSV without a header, or a JSON array of objects
        path: PathBuf,
        /// Input format (default: from the file extension)
        #[arg(long, value_enum)]
        format: Option<ingredients::Format>,
    },
    /// Insert the default tags
    LoadTags,
    /// Create a staff user, or promote an existing one
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        /// Only used when the user does not exist yet
        #[arg(long, env = "FOODGRAM_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long, default_value = "Admin")]
        first_name: String,
        #[arg(long, default_value = "Admin")]
        last_name: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut conn = db::connect(cli.database_url.as_deref())?;

    match cli.command {
        Commands::Migrate => {
            let applied = db::run_migrations(&mut conn)?;
            println!("Applied {} migration(s)", applied);
        }
        Commands::LoadIngredients { path, format } => {
            let summary = ingredients::load(&mut conn, &path, format)?;
            println!(
                "Read {} ingredient(s): {} inserted, {} already present, {} invalid",
                summary.read, summary.inserted, summary.existing, summary.invalid
            );
        }
        Commands::LoadTags => {
            let inserted = tags::load_default_tags(&mut conn)?;
            println!("Inserted {} tag(s)", inserted);
        }
        Commands::CreateAdmin {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let outcome = admin::create_admin(
                &mut conn,
                &admin::AdminRequest {
                    email: &email,
                    username: &username,
                    password: password.as_deref(),
                    first_name: &first_name,
                    last_name: &last_name,
                },
            )?;
            println!("{}", outcome);
        }
    }

    Ok(())
}
