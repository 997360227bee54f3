use crate::api::{DetailResponse, Json, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::{Ingredient, IngredientChanges};
use crate::schema::ingredients;
use axum::extract::{Path, State};
use diesel::prelude::*;
use foodgram_core::policy::check_catalog;
use foodgram_core::validation::{validate_ingredient, WriteMode};
use foodgram_core::Access;
use std::sync::Arc;

use super::create::IngredientWrite;

#[utoipa::path(
    patch,
    path = "/api/ingredients/{id}/",
    tag = "ingredients",
    params(
        ("id" = i32, Path, description = "Ingredient ID")
    ),
    request_body = IngredientWrite,
    responses(
        (status = 200, description = "Ingredient updated", body = Ingredient),
        (status = 400, description = "Invalid or duplicate fields", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 403, description = "Staff only", body = DetailResponse),
        (status = 404, description = "Ingredient not found", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn update_ingredient(
    auth: AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(request): Json<IngredientWrite>,
) -> ApiResult<Json<Ingredient>> {
    check_catalog(Access::Write, Some(&auth.principal()))?;

    let draft = request.draft();
    validate_ingredient(&draft, WriteMode::Update)?;

    let mut conn = pool.get()?;
    let changes = IngredientChanges {
        name: draft.name,
        measurement_unit: draft.measurement_unit,
    };

    let ingredient: Ingredient = if changes.name.is_none() && changes.measurement_unit.is_none() {
        ingredients::table
            .find(id)
            .select(Ingredient::as_select())
            .first(&mut conn)?
    } else {
        diesel::update(ingredients::table.find(id))
            .set(&changes)
            .returning(Ingredient::as_returning())
            .get_result(&mut conn)?
    };

    tracing::info!(ingredient_id = ingredient.id, "ingredient updated");
    Ok(Json(ingredient))
}
