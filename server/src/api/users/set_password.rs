use crate::api::{DetailResponse, Json, ValidationErrorResponse};
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::db::DbPool;
use crate::error::{ApiError, ApiResult};
use crate::schema::users;
use axum::{extract::State, http::StatusCode};
use diesel::prelude::*;
use foodgram_core::validation::validate_new_password;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

#[utoipa::path(
    post,
    path = "/api/users/set_password/",
    tag = "users",
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Wrong current password or blank new one", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn set_password(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<SetPasswordRequest>,
) -> ApiResult<StatusCode> {
    validate_new_password(
        &req.new_password,
        verify_password(&req.current_password, &user.password_hash),
    )?;

    let password_hash = hash_password(&req.new_password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let mut conn = pool.get()?;
    diesel::update(users::table.find(user.id))
        .set(users::password_hash.eq(&password_hash))
        .execute(&mut conn)?;

    tracing::info!(user_id = user.id, "password changed");
    Ok(StatusCode::NO_CONTENT)
}
