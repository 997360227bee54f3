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
        .route(
            "/api/ingredients/",
            get(list::list_ingredients).post(create::create_ingredient),
        )
        .route(
            "/api/ingredients/{id}/",
            get(get::get_ingredient)
                .patch(update::update_ingredient)
                .delete(delete::delete_ingredient),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_ingredients,
        get::get_ingredient,
        create::create_ingredient,
        update::update_ingredient,
        delete::delete_ingredient,
    ),
    components(schemas(create::IngredientWrite))
)]
pub struct ApiDoc;
