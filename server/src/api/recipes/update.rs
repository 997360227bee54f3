use crate::api::{DetailResponse, Json, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ApiError, ApiResult};
use crate::models::{Recipe, RecipeChanges};
use crate::projections::{render_recipe, RecipeView};
use crate::schema::recipes;
use axum::extract::{Path, State};
use diesel::prelude::*;
use foodgram_core::policy::check_recipe;
use foodgram_core::validation::{validate_recipe, WriteMode};
use foodgram_core::{Access, Viewer};
use std::sync::Arc;

use super::write::{check_exist, check_name_free, replace_ingredients, replace_tags, small, RecipeWrite};

/// Partial update. Present scalars replace stored values; a present `tags`
/// or `ingredients` list replaces the whole set.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = RecipeWrite,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeView),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 403, description = "Not the author", body = DetailResponse),
        (status = 404, description = "Recipe not found", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn update_recipe(
    auth: AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(request): Json<RecipeWrite>,
) -> ApiResult<Json<RecipeView>> {
    let mut conn = pool.get()?;

    let existing: Recipe = recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)?;
    check_recipe(Access::Write, Some(&auth.principal()), existing.author_id)?;

    let amounts = request.amounts();
    let draft = request.draft(amounts.as_deref());
    validate_recipe(&draft, WriteMode::Update)?;

    let recipe = conn.transaction::<_, ApiError, _>(|conn| {
        check_exist(conn, &draft)?;
        if let Some(name) = draft.name {
            check_name_free(conn, existing.author_id, name, Some(existing.id))?;
        }

        let changes = RecipeChanges {
            name: draft.name,
            image: draft.image,
            text: draft.text,
            cooking_time: draft.cooking_time.map(small),
        };
        let recipe = if changes.is_empty() {
            existing
        } else {
            diesel::update(recipes::table.find(id))
                .set(&changes)
                .returning(Recipe::as_returning())
                .get_result(conn)?
        };

        if let Some(tag_ids) = draft.tags {
            replace_tags(conn, recipe.id, tag_ids)?;
        }
        if let Some(entries) = draft.ingredients {
            replace_ingredients(conn, recipe.id, entries)?;
        }
        Ok(recipe)
    })?;

    tracing::info!(recipe_id = recipe.id, "recipe updated");

    let view = render_recipe(&mut conn, Viewer::User(auth.0.id), recipe)?;
    Ok(Json(view))
}
