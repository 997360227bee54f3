use crate::api::DetailResponse;
use crate::auth::AuthUser;
use crate::projections::UserView;
use axum::Json;
use foodgram_core::membership::Subscriptions;

/// Nobody can follow themselves, so `is_subscribed` is always false here.
#[utoipa::path(
    get,
    path = "/api/users/me/",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Unauthorized", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<UserView> {
    Json(UserView::new(&user, &Subscriptions::default()))
}
