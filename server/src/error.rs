use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::r2d2;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use foodgram_core::validation::unique_violation_message;
use foodgram_core::{LimitError, PageError, PolicyError, ShoppingListError, ValidationErrors};
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

pub const NOT_FOUND: &str = "Not found.";
pub const ALREADY_ADDED: &str = "Recipe is already added.";
pub const NOT_IN_LIST: &str = "Recipe is not in the list.";
pub const NOT_SUBSCRIBED: &str = "You are not subscribed to this author.";

#[derive(Error, Debug)]
pub enum ApiError {
    // 400, field-keyed
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    // 400, `{"errors": "..."}`
    #[error("Bad request: {0}")]
    BadRequest(String),

    // 401 for a missing or bad token
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    // 401 / 403
    #[error("{0}")]
    Policy(#[from] PolicyError),

    // 404
    #[error("Not found: {0}")]
    NotFound(&'static str),

    // 500
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Diesel pool error: {0:?}")]
    Pool(#[from] r2d2::PoolError),

    #[error("Diesel error: {0:?}")]
    Database(DieselError),
}

impl ApiError {
    pub fn not_found() -> Self {
        ApiError::NotFound(NOT_FOUND)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::Policy(PolicyError::Unauthenticated) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Policy(PolicyError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Pool(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> Self {
        if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &err {
            if let Some((field, message)) = info.constraint_name().and_then(unique_violation_message)
            {
                return ApiError::Validation(ValidationErrors::single(field, message));
            }
        }
        match err {
            DieselError::NotFound => ApiError::not_found(),
            other => ApiError::Database(other),
        }
    }
}

impl From<ShoppingListError> for ApiError {
    fn from(err: ShoppingListError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::InvalidPage => ApiError::NotFound("Invalid page."),
        }
    }
}

impl From<LimitError> for ApiError {
    fn from(err: LimitError) -> Self {
        ApiError::Validation(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::BadRequest(message) => json!({ "errors": message }),
            ApiError::Unauthorized(message) | ApiError::NotFound(message) => {
                json!({ "detail": message })
            }
            ApiError::Policy(err) => json!({ "detail": err.to_string() }),
            other => {
                tracing::error!("{}", other);
                json!({ "detail": "Internal server error." })
            }
        };
        (status, Json(body)).into_response()
    }
}
