pub mod get;
pub mod list;
pub mod me;
pub mod set_password;
pub mod signup;
pub mod subscribe;
pub mod subscriptions;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Accounts, profiles and subscriptions
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/", get(list::list_users).post(signup::signup))
        .route("/api/users/me/", get(me::me))
        .route("/api/users/set_password/", post(set_password::set_password))
        .route(
            "/api/users/subscriptions/",
            get(subscriptions::list_subscriptions),
        )
        .route("/api/users/{id}/", get(get::get_user))
        .route(
            "/api/users/{id}/subscribe/",
            post(subscribe::subscribe).delete(subscribe::unsubscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_users,
        signup::signup,
        get::get_user,
        me::me,
        set_password::set_password,
        subscribe::subscribe,
        subscribe::unsubscribe,
        subscriptions::list_subscriptions,
    ),
    components(schemas(
        crate::projections::UserView,
        crate::projections::SubscriptionView,
        crate::projections::RecipeShort,
        signup::SignupRequest,
        signup::SignupResponse,
        set_password::SetPasswordRequest,
    ))
)]
pub struct ApiDoc;
