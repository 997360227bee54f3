use crate::db::DbPool;
use crate::error::ApiError;
use crate::models::User;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use foodgram_core::{Principal, Viewer};
use std::sync::Arc;

use super::db::get_user_from_token;

const NOT_PROVIDED: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Invalid token.";

/// Extractor for handlers that require a logged-in user.
pub struct AuthUser(pub User);

/// Extractor for handlers open to anonymous callers. A header that is
/// present but invalid is still rejected.
pub struct MaybeUser(pub Option<User>);

impl AuthUser {
    pub fn principal(&self) -> Principal {
        principal(&self.0)
    }
}

impl MaybeUser {
    pub fn viewer(&self) -> Viewer {
        match &self.0 {
            Some(user) => Viewer::User(user.id),
            None => Viewer::Anonymous,
        }
    }

    pub fn principal(&self) -> Option<Principal> {
        self.0.as_ref().map(principal)
    }
}

fn principal(user: &User) -> Principal {
    Principal {
        user_id: user.id,
        is_staff: user.is_staff,
    }
}

/// Pulls the key out of `Authorization: Token <key>` or `Bearer <key>`.
/// `Ok(None)` when there is no header at all.
pub fn token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized(INVALID_TOKEN))?;

    let (scheme, key) = value
        .trim()
        .split_once(' ')
        .ok_or(ApiError::Unauthorized(INVALID_TOKEN))?;
    let key = key.trim();

    if !(scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer"))
        || key.is_empty()
        || key.contains(' ')
    {
        return Err(ApiError::Unauthorized(INVALID_TOKEN));
    }
    Ok(Some(key))
}

fn resolve(parts: &Parts, pool: &DbPool) -> Result<Option<User>, ApiError> {
    match token_from_headers(&parts.headers)? {
        None => Ok(None),
        Some(token) => get_user_from_token(pool, token)?
            .map(Some)
            .ok_or(ApiError::Unauthorized(INVALID_TOKEN)),
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = Arc::<DbPool>::from_ref(state);
        resolve(parts, &pool)?
            .map(AuthUser)
            .ok_or(ApiError::Unauthorized(NOT_PROVIDED))
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = Arc::<DbPool>::from_ref(state);
        Ok(MaybeUser(resolve(parts, &pool)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_no_header_is_anonymous() {
        assert!(matches!(token_from_headers(&HeaderMap::new()), Ok(None)));
    }

    #[test]
    fn test_token_and_bearer_schemes() {
        assert_eq!(token_from_headers(&headers("Token abc123")).unwrap(), Some("abc123"));
        assert_eq!(token_from_headers(&headers("Bearer abc123")).unwrap(), Some("abc123"));
        assert_eq!(token_from_headers(&headers("token abc123")).unwrap(), Some("abc123"));
    }

    #[test]
    fn test_malformed_headers_rejected() {
        for value in ["abc123", "Basic abc123", "Token ", "Token a b"] {
            assert!(
                matches!(
                    token_from_headers(&headers(value)),
                    Err(ApiError::Unauthorized(_))
                ),
                "{value}"
            );
        }
    }
}
