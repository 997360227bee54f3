use crate::api::DetailResponse;
use crate::auth::{delete_session, token_from_headers, AuthUser};
use crate::db::DbPool;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/auth/token/logout/",
    tag = "auth",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorized", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn logout(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let token = token_from_headers(&headers)?
        .ok_or(ApiError::Unauthorized("Authentication credentials were not provided."))?;

    let mut conn = pool.get()?;
    delete_session(&mut conn, token)?;
    tracing::debug!(user_id = user.id, "session revoked");

    Ok(StatusCode::NO_CONTENT)
}
