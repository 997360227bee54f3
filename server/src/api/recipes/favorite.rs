use super::lists::RecipeList;
use crate::api::{DetailResponse, ErrorsResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::projections::RecipeShort;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Added to favorites", body = RecipeShort),
        (status = 400, description = "Already in favorites", body = ErrorsResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 404, description = "Recipe not found", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn add_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> ApiResult<(StatusCode, Json<RecipeShort>)> {
    RecipeList::Favorites.add(&pool, user.id, id)
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite/",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Removed from favorites"),
        (status = 400, description = "Not in favorites", body = ErrorsResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 404, description = "Recipe not found", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    RecipeList::Favorites.remove(&pool, user.id, id)
}
