pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Public reads; writes are staff-only
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tags/", get(list::list_tags).post(create::create_tag))
        .route(
            "/api/tags/{id}/",
            get(get::get_tag)
                .patch(update::update_tag)
                .delete(delete::delete_tag),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_tags,
        get::get_tag,
        create::create_tag,
        update::update_tag,
        delete::delete_tag,
    ),
    components(schemas(create::TagWrite))
)]
pub struct ApiDoc;
