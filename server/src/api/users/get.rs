use crate::api::DetailResponse;
use crate::auth::MaybeUser;
use crate::db::DbPool;
use crate::error::{ApiError, ApiResult};
use crate::models::User;
use crate::projections::{render_users, UserView};
use crate::schema::users;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/{id}/",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserView),
        (status = 404, description = "User not found", body = DetailResponse)
    )
)]
pub async fn get_user(
    viewer: MaybeUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<UserView>> {
    let mut conn = pool.get()?;

    let user: User = users::table
        .find(id)
        .select(User::as_select())
        .first(&mut conn)?;

    render_users(&mut conn, viewer.viewer(), std::slice::from_ref(&user))?
        .pop()
        .map(Json)
        .ok_or_else(ApiError::not_found)
}
