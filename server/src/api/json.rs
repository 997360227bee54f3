//! JSON body extractor whose rejections are ordinary validation errors.
//!
//! `axum::Json` answers a body that fails to deserialize with a 422 and a
//! plain-text message. Here the same failure becomes a 400 keyed by the
//! offending field, so a missing key reads like any other invalid field.

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use foodgram_core::ValidationErrors;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(rejection_errors(&rejection).into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

fn rejection_errors(rejection: &JsonRejection) -> ValidationErrors {
    match rejection {
        JsonRejection::JsonDataError(_) => data_errors(&rejection.body_text()),
        _ => ValidationErrors::non_field(rejection.body_text()),
    }
}

/// Turns a deserialization message such as
/// `ingredients[0].amount: invalid type: floating point ...` or
/// `missing field `last_name` at line 1 column 68` into a field-keyed error.
/// Nested paths are reported under their top-level field.
pub fn data_errors(body_text: &str) -> ValidationErrors {
    let text = body_text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(body_text);
    let text = strip_location(text);

    let (path, detail) = match text.split_once(": ") {
        Some((path, detail)) if is_path(path) => (Some(path), detail),
        _ => (None, text),
    };

    if let Some(field) = missing_field(detail) {
        let key = path.map(top_level).unwrap_or(field);
        return ValidationErrors::single(key, REQUIRED_MESSAGE);
    }

    match path {
        Some(path) => ValidationErrors::single(top_level(path), format!("Invalid value: {}.", detail)),
        None => ValidationErrors::non_field(format!("Invalid request body: {}.", detail)),
    }
}

fn strip_location(text: &str) -> &str {
    match text.rfind(" at line ") {
        Some(index) => &text[..index],
        None => text,
    }
}

/// A serde path is `field`, `field.inner` or `field[0].inner`, never prose.
fn is_path(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_alphanumeric() || "_.[]".contains(c))
}

fn top_level(path: &str) -> &str {
    path.split(['.', '[']).next().unwrap_or(path)
}

fn missing_field(detail: &str) -> Option<&str> {
    detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Amount {
        id: i32,
        amount: i64,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct RecipeBody {
        name: String,
        cooking_time: i64,
        ingredients: Vec<Amount>,
    }

    async fn extract(body: &'static str) -> Result<Json<RecipeBody>, ApiError> {
        let request = Request::builder()
            .method("POST")
            .uri("/api/recipes/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        Json::<RecipeBody>::from_request(request, &()).await
    }

    async fn rejected(body: &'static str) -> (StatusCode, serde_json::Value) {
        let response = extract(body).await.unwrap_err().into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let Json(body) = extract(r#"{"name":"Soup","cooking_time":5,"ingredients":[]}"#)
            .await
            .unwrap();
        assert_eq!(body.name, "Soup");
    }

    #[tokio::test]
    async fn test_missing_field_is_a_field_error() {
        let (status, body) = rejected(r#"{"name":"Soup","ingredients":[]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"cooking_time": [REQUIRED_MESSAGE]}));
    }

    #[tokio::test]
    async fn test_wrong_type_is_keyed_by_field() {
        let (status, body) =
            rejected(r#"{"name":"Soup","cooking_time":"abc","ingredients":[]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["cooking_time"][0]
            .as_str()
            .unwrap()
            .starts_with("Invalid value"));
    }

    #[tokio::test]
    async fn test_nested_error_reported_under_top_level_field() {
        let (status, body) = rejected(
            r#"{"name":"Soup","cooking_time":5,"ingredients":[{"id":1,"amount":1.5}]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("ingredients").is_some(), "{body}");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_non_field_error() {
        let (status, body) = rejected(r#"{"name": "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("errors").is_some(), "{body}");
    }

    #[test]
    fn test_data_errors_parsing() {
        let errors = data_errors(
            "Failed to deserialize the JSON body into the target type: \
             missing field `last_name` at line 1 column 68",
        );
        assert_eq!(errors.messages("last_name"), [REQUIRED_MESSAGE]);

        let errors = data_errors(
            "Failed to deserialize the JSON body into the target type: \
             ingredients[0]: missing field `amount` at line 1 column 30",
        );
        assert_eq!(errors.messages("ingredients"), [REQUIRED_MESSAGE]);

        let errors = data_errors("invalid type: integer `5`, expected a map at line 1 column 1");
        assert!(errors.contains("errors"));
    }
}
