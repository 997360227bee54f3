use crate::api::DetailResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use foodgram_core::policy::check_recipe;
use foodgram_core::Access;
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 403, description = "Not the author", body = DetailResponse),
        (status = 404, description = "Recipe not found", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn delete_recipe(
    auth: AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let mut conn = pool.get()?;

    let author_id: i32 = recipes::table
        .find(id)
        .select(recipes::author_id)
        .first(&mut conn)?;
    check_recipe(Access::Write, Some(&auth.principal()), author_id)?;

    // links, favorites and cart entries go with it (ON DELETE CASCADE)
    diesel::delete(recipes::table.find(id)).execute(&mut conn)?;

    tracing::info!(recipe_id = id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
