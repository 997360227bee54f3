pub mod auth;
pub mod ingredients;
pub mod json;
pub mod recipes;
pub mod tags;
pub mod users;

use crate::error::ApiError;
use crate::models::{Ingredient, Tag};
use crate::AppState;
use axum::Router;
use foodgram_core::{Page, PageRequest};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

pub use json::Json;

/// `{"detail": "..."}`: not found, authentication and permission errors
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DetailResponse {
    pub detail: String,
}

/// `{"errors": "..."}`: conflicts and "not in list" errors
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorsResponse {
    pub errors: String,
}

/// Field name to list of messages
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ValidationErrorResponse(pub BTreeMap<String, Vec<String>>);

/// Wire form of a page; `Page` itself lives in the core crate.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub count: i64,
    /// Relative link to the next page
    pub next: Option<String>,
    /// Relative link to the previous page
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            count: page.count,
            next: page.next,
            previous: page.previous,
            results: page.results,
        }
    }
}

/// Decodes a raw query string into ordered pairs, keeping repeated keys.
pub fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

/// Splits rows selected alongside `count_over()` into the page items and the
/// total. An empty page past the first means the page does not exist.
pub fn split_counted<T>(
    request: PageRequest,
    rows: Vec<(T, i64)>,
) -> Result<(Vec<T>, i64), ApiError> {
    let Some(total) = rows.first().map(|(_, total)| *total) else {
        return match request.page {
            1 => Ok((Vec::new(), 0)),
            _ => Err(foodgram_core::PageError::InvalidPage.into()),
        };
    };
    Ok((rows.into_iter().map(|(item, _)| item).collect(), total))
}

/// Checks the page exists and wraps the results with neighbour links.
pub fn paginate<T>(
    request: PageRequest,
    count: i64,
    results: Vec<T>,
    path: &str,
    query: &[(String, String)],
) -> Result<Paginated<T>, ApiError> {
    request.check_in_range(count)?;
    Ok(Page::new(request, count, results, path, query).into())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(tags::router())
        .merge(ingredients::router())
        .merge(recipes::router())
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Foodgram API", description = "Recipes, subscriptions and shopping lists"),
        components(schemas(
            DetailResponse,
            ErrorsResponse,
            ValidationErrorResponse,
            Ingredient,
            Tag
        ))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "token_auth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Token <key>",
            ))),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        auth::ApiDoc::openapi(),
        users::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_keeps_repeats() {
        let pairs = query_pairs(Some("tags=breakfast&tags=dinner&page=2&name=%D0%B0"));
        assert_eq!(
            pairs,
            vec![
                ("tags".to_string(), "breakfast".to_string()),
                ("tags".to_string(), "dinner".to_string()),
                ("page".to_string(), "2".to_string()),
                ("name".to_string(), "а".to_string()),
            ]
        );
        assert!(query_pairs(None).is_empty());
    }

    #[test]
    fn test_split_counted() {
        let first = PageRequest::default();
        let (items, total) = split_counted(first, vec![("a", 8), ("b", 8)]).unwrap();
        assert_eq!(items, ["a", "b"]);
        assert_eq!(total, 8);

        let (items, total) = split_counted(first, Vec::<(&str, i64)>::new()).unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);

        let later = PageRequest { page: 4, limit: 6 };
        assert!(split_counted(later, Vec::<(&str, i64)>::new()).is_err());
    }

    #[test]
    fn test_paginate_rejects_page_past_end() {
        let request = PageRequest { page: 3, limit: 6 };
        assert!(paginate(request, 7, Vec::<i32>::new(), "/api/recipes/", &[]).is_err());
    }

    #[test]
    fn test_openapi_has_every_route() {
        let spec = openapi();
        for path in [
            "/api/auth/token/login/",
            "/api/auth/token/logout/",
            "/api/users/",
            "/api/users/{id}/",
            "/api/users/me/",
            "/api/users/set_password/",
            "/api/users/subscriptions/",
            "/api/users/{id}/subscribe/",
            "/api/tags/",
            "/api/tags/{id}/",
            "/api/ingredients/",
            "/api/ingredients/{id}/",
            "/api/recipes/",
            "/api/recipes/{id}/",
            "/api/recipes/{id}/favorite/",
            "/api/recipes/{id}/shopping_cart/",
            "/api/recipes/download_shopping_cart/",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
        let components = spec.components.unwrap();
        assert!(components.security_schemes.contains_key("token_auth"));
    }
}
