use crate::api::{DetailResponse, Json, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::{Ingredient, NewIngredient};
use crate::schema::ingredients;
use axum::{extract::State, http::StatusCode};
use diesel::prelude::*;
use foodgram_core::policy::check_catalog;
use foodgram_core::validation::{validate_ingredient, IngredientDraft, WriteMode};
use foodgram_core::Access;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Body for create and partial update
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IngredientWrite {
    pub name: Option<String>,
    pub measurement_unit: Option<String>,
}

impl IngredientWrite {
    pub fn draft(&self) -> IngredientDraft<'_> {
        IngredientDraft {
            name: self.name.as_deref().map(str::trim),
            measurement_unit: self.measurement_unit.as_deref().map(str::trim),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/ingredients/",
    tag = "ingredients",
    request_body(content = IngredientWrite, example = json!({"name": "flour", "measurement_unit": "g"})),
    responses(
        (status = 201, description = "Ingredient created", body = Ingredient),
        (status = 400, description = "Invalid or duplicate fields", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 403, description = "Staff only", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn create_ingredient(
    auth: AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<IngredientWrite>,
) -> ApiResult<(StatusCode, Json<Ingredient>)> {
    check_catalog(Access::Write, Some(&auth.principal()))?;

    let draft = request.draft();
    validate_ingredient(&draft, WriteMode::Create)?;

    let mut conn = pool.get()?;
    let ingredient: Ingredient = diesel::insert_into(ingredients::table)
        .values(NewIngredient {
            name: draft.name.unwrap_or_default(),
            measurement_unit: draft.measurement_unit.unwrap_or_default(),
        })
        .returning(Ingredient::as_returning())
        .get_result(&mut conn)?;

    tracing::info!(ingredient_id = ingredient.id, "ingredient created");
    Ok((StatusCode::CREATED, Json(ingredient)))
}
