use crate::api::DetailResponse;
use crate::auth::MaybeUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::Recipe;
use crate::projections::{render_recipe, RecipeView};
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe", body = RecipeView),
        (status = 404, description = "Recipe not found", body = DetailResponse)
    )
)]
pub async fn get_recipe(
    viewer: MaybeUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<RecipeView>> {
    let mut conn = pool.get()?;

    let recipe: Recipe = recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)?;

    Ok(Json(render_recipe(&mut conn, viewer.viewer(), recipe)?))
}
