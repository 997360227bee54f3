use crate::api::{DetailResponse, ErrorsResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::schema::{ingredients, recipe_ingredients, shopping_carts};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use diesel::prelude::*;
use foodgram_core::shopping_list::attachment_filename;
use foodgram_core::{CartLine, ShoppingList};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart/",
    tag = "recipes",
    responses(
        (status = 200, description = "Aggregated shopping list", content_type = "text/plain", body = String),
        (status = 400, description = "Shopping cart is empty", body = ErrorsResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> ApiResult<Response> {
    let mut conn = pool.get()?;

    let cart_recipes: i64 = shopping_carts::table
        .filter(shopping_carts::user_id.eq(user.id))
        .count()
        .get_result(&mut conn)?;

    let in_cart = shopping_carts::table
        .filter(shopping_carts::user_id.eq(user.id))
        .select(shopping_carts::recipe_id);
    let rows: Vec<(String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(in_cart))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(&mut conn)?;

    let list = ShoppingList::aggregate(
        usize::try_from(cart_recipes).unwrap_or_default(),
        rows.into_iter()
            .map(|(name, unit, amount)| CartLine::new(name, unit, i64::from(amount))),
    )?;

    tracing::debug!(user_id = user.id, entries = list.entries().len(), "shopping list built");

    let disposition = format!(
        "attachment; filename={}",
        attachment_filename(&user.username)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        list.render(),
    )
        .into_response())
}
