use crate::api::{Json, ValidationErrorResponse};
use crate::auth::hash_password;
use crate::db::DbPool;
use crate::error::{ApiError, ApiResult};
use crate::models::{NewUser, User};
use crate::schema::users;
use axum::{extract::State, http::StatusCode};
use diesel::dsl::exists;
use diesel::prelude::*;
use foodgram_core::validation::{unique_violation_message, validate_signup, SignupDraft};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignupResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[utoipa::path(
    post,
    path = "/api/users/",
    tag = "users",
    request_body(content = SignupRequest, example = json!({
        "email": "cook@example.com",
        "username": "cook",
        "first_name": "Ann",
        "last_name": "Lee",
        "password": "password"
    })),
    responses(
        (status = 201, description = "User created", body = SignupResponse),
        (status = 400, description = "Invalid or duplicate fields", body = ValidationErrorResponse)
    )
)]
pub async fn signup(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let email = req.email.trim();
    let username = req.username.trim();
    let first_name = req.first_name.trim();
    let last_name = req.last_name.trim();

    let mut errors = validate_signup(&SignupDraft {
        email,
        username,
        first_name,
        last_name,
        password: &req.password,
    })
    .err()
    .unwrap_or_default();

    let mut conn = pool.get()?;

    let email_taken: bool =
        diesel::select(exists(users::table.filter(users::email.eq(email)))).get_result(&mut conn)?;
    let username_taken: bool =
        diesel::select(exists(users::table.filter(users::username.eq(username))))
            .get_result(&mut conn)?;
    for (taken, constraint) in [
        (email_taken, "users_email_key"),
        (username_taken, "users_username_key"),
    ] {
        if let Some((field, message)) = unique_violation_message(constraint).filter(|_| taken) {
            errors.add(field, message);
        }
    }
    errors.into_result()?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    let user: User = diesel::insert_into(users::table)
        .values(NewUser {
            email,
            username,
            first_name,
            last_name,
            password_hash: &password_hash,
            is_staff: false,
        })
        .returning(User::as_returning())
        .get_result(&mut conn)?;

    tracing::info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::{FromRequest, Request};
    use axum::http::header;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_missing_last_name_is_a_field_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/users/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"email":"cook@example.com","username":"cook","first_name":"Ann","password":"pw"}"#,
            ))
            .unwrap();

        let response = Json::<SignupRequest>::from_request(request, &())
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"last_name": ["This field is required."]})
        );
    }
}
