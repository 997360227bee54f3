pub mod login;
pub mod logout;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

/// Token issue and revoke
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/token/login/", post(login::login))
        .route("/api/auth/token/logout/", post(logout::logout))
}

#[derive(OpenApi)]
#[openapi(
    paths(login::login, logout::logout),
    components(schemas(login::LoginRequest, login::LoginResponse))
)]
pub struct ApiDoc;
