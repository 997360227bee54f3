pub mod create;
pub mod delete;
pub mod download;
pub mod favorite;
pub mod get;
pub mod list;
pub mod lists;
pub mod shopping_cart;
pub mod update;
pub mod write;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Recipes, favorites and the shopping cart
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/recipes/",
            get(list::list_recipes).post(create::create_recipe),
        )
        .route(
            "/api/recipes/download_shopping_cart/",
            get(download::download_shopping_cart),
        )
        .route(
            "/api/recipes/{id}/",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/api/recipes/{id}/favorite/",
            post(favorite::add_favorite).delete(favorite::remove_favorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart/",
            post(shopping_cart::add_to_cart).delete(shopping_cart::remove_from_cart),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        favorite::add_favorite,
        favorite::remove_favorite,
        shopping_cart::add_to_cart,
        shopping_cart::remove_from_cart,
        download::download_shopping_cart,
    ),
    components(schemas(
        crate::projections::RecipeView,
        crate::projections::RecipeShort,
        crate::projections::IngredientLine,
        write::RecipeWrite,
        write::IngredientAmountInput,
    ))
)]
pub struct ApiDoc;
