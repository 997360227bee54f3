use crate::schema::tags;
use anyhow::{anyhow, Context, Result};
use diesel::prelude::*;
use foodgram_core::seed::DEFAULT_TAGS;

#[derive(Insertable)]
#[diesel(table_name = tags)]
struct NewTag<'a> {
    name: &'a str,
    color: &'a str,
    slug: &'a str,
}

/// Inserts the default tags, skipping any that clash with an existing name,
/// color or slug. Returns the number inserted.
pub fn load_default_tags(conn: &mut PgConnection) -> Result<usize> {
    let mut rows = Vec::with_capacity(DEFAULT_TAGS.len());
    for tag in DEFAULT_TAGS {
        tag.validate()
            .map_err(|errors| anyhow!("Default tag {} is invalid: {}", tag.slug, errors))?;
        rows.push(NewTag {
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        });
    }

    let inserted = diesel::insert_into(tags::table)
        .values(&rows)
        .on_conflict_do_nothing()
        .execute(conn)
        .context("Failed to insert default tags")?;
    tracing::info!(inserted, "default tags loaded");
    Ok(inserted)
}
