use crate::api::{DetailResponse, Json, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ApiError, ApiResult};
use crate::models::Recipe;
use crate::projections::{render_recipe, RecipeView};
use crate::schema::recipes;
use axum::{extract::State, http::StatusCode};
use diesel::prelude::*;
use foodgram_core::validation::{validate_recipe, WriteMode};
use foodgram_core::Viewer;
use std::sync::Arc;

use super::write::{
    check_exist, check_name_free, new_recipe, replace_ingredients, replace_tags, RecipeWrite,
};

#[utoipa::path(
    post,
    path = "/api/recipes/",
    tag = "recipes",
    request_body(content = RecipeWrite, example = json!({
        "tags": [1, 2],
        "ingredients": [{"id": 1123, "amount": 10}],
        "name": "Pancakes",
        "image": "recipes/images/pancakes.png",
        "text": "Whisk, rest, fry.",
        "cooking_time": 20
    })),
    responses(
        (status = 201, description = "Recipe created", body = RecipeView),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<RecipeWrite>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    let amounts = request.amounts();
    let draft = request.draft(amounts.as_deref());
    validate_recipe(&draft, WriteMode::Create)?;

    let mut conn = pool.get()?;

    let recipe = conn.transaction::<_, ApiError, _>(|conn| {
        check_exist(conn, &draft)?;
        let name = draft.name.unwrap_or_default();
        check_name_free(conn, user.id, name, None)?;

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(new_recipe(&draft, user.id))
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        replace_tags(conn, recipe.id, draft.tags.unwrap_or_default())?;
        replace_ingredients(conn, recipe.id, draft.ingredients.unwrap_or_default())?;
        Ok(recipe)
    })?;

    tracing::info!(recipe_id = recipe.id, author_id = user.id, "recipe created");

    let view = render_recipe(&mut conn, Viewer::User(user.id), recipe)?;
    Ok((StatusCode::CREATED, Json(view)))
}
