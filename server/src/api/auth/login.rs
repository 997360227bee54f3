use crate::api::{Json, ValidationErrorResponse};
use crate::auth::{create_session, verify_password};
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::User;
use crate::schema::users;
use axum::extract::State;
use diesel::prelude::*;
use foodgram_core::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub auth_token: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/token/login/",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"email": "cook@example.com", "password": "password"})),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid credentials", body = ValidationErrorResponse)
    )
)]
pub async fn login(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let mut conn = pool.get()?;

    let user: Option<User> = users::table
        .filter(users::email.eq(req.email.trim()))
        .select(User::as_select())
        .first(&mut conn)
        .optional()?;

    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        _ => return Err(ValidationErrors::non_field(BAD_CREDENTIALS).into()),
    };

    let auth_token = create_session(&mut conn, user.id)?;
    tracing::debug!(user_id = user.id, "session created");

    Ok(Json(LoginResponse { auth_token }))
}
