use crate::api::DetailResponse;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::Ingredient;
use crate::schema::ingredients;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/ingredients/{id}/",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Ingredient", body = Ingredient),
        (status = 404, description = "Ingredient not found", body = DetailResponse)
    )
)]
pub async fn get_ingredient(
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Ingredient>> {
    let mut conn = pool.get()?;
    let ingredient = ingredients::table
        .find(id)
        .select(Ingredient::as_select())
        .first(&mut conn)?;
    Ok(Json(ingredient))
}
