use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::Ingredient;
use crate::raw_sql::lower_name;
use crate::schema::ingredients;
use axum::{
    extract::{Query, State},
    Json,
};
use diesel::prelude::*;
use foodgram_core::IngredientQuery;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListIngredientsParams {
    /// Case-insensitive substring of the ingredient name
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/ingredients/",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "Matching ingredients, by name", body = Vec<Ingredient>)
    )
)]
pub async fn list_ingredients(
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListIngredientsParams>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let filter = IngredientQuery { name: params.name };

    let mut conn = pool.get()?;

    let mut query = ingredients::table.into_boxed();
    if let Some(pattern) = filter.name_pattern() {
        query = query.filter(ingredients::name.ilike(pattern));
    }

    let ingredients = query
        .order((lower_name(), ingredients::measurement_unit.asc(), ingredients::id.asc()))
        .select(Ingredient::as_select())
        .load(&mut conn)?;

    Ok(Json(ingredients))
}
