//! Favorites and the shopping cart share one shape: a (user, recipe) pair
//! that is either present or not.

use crate::db::DbPool;
use crate::error::{ApiError, ApiResult, ALREADY_ADDED, NOT_IN_LIST};
use crate::models::{NewCartItem, NewFavorite, Recipe};
use crate::projections::RecipeShort;
use crate::schema::{favorites, recipes, shopping_carts};
use axum::{http::StatusCode, Json};
use diesel::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    fn label(self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping_cart",
        }
    }

    /// False when the pair was already present.
    fn insert(self, conn: &mut PgConnection, user_id: i32, recipe_id: i32) -> QueryResult<bool> {
        let inserted = match self {
            RecipeList::Favorites => diesel::insert_into(favorites::table)
                .values(NewFavorite { user_id, recipe_id })
                .on_conflict_do_nothing()
                .execute(conn)?,
            RecipeList::ShoppingCart => diesel::insert_into(shopping_carts::table)
                .values(NewCartItem { user_id, recipe_id })
                .on_conflict_do_nothing()
                .execute(conn)?,
        };
        Ok(inserted > 0)
    }

    /// False when there was nothing to delete.
    fn delete(self, conn: &mut PgConnection, user_id: i32, recipe_id: i32) -> QueryResult<bool> {
        let deleted = match self {
            RecipeList::Favorites => diesel::delete(
                favorites::table
                    .filter(favorites::user_id.eq(user_id))
                    .filter(favorites::recipe_id.eq(recipe_id)),
            )
            .execute(conn)?,
            RecipeList::ShoppingCart => diesel::delete(
                shopping_carts::table
                    .filter(shopping_carts::user_id.eq(user_id))
                    .filter(shopping_carts::recipe_id.eq(recipe_id)),
            )
            .execute(conn)?,
        };
        Ok(deleted > 0)
    }

    pub fn add(
        self,
        pool: &DbPool,
        user_id: i32,
        recipe_id: i32,
    ) -> ApiResult<(StatusCode, Json<RecipeShort>)> {
        let mut conn = pool.get()?;

        let recipe: Recipe = recipes::table
            .find(recipe_id)
            .select(Recipe::as_select())
            .first(&mut conn)?;

        if !self.insert(&mut conn, user_id, recipe.id)? {
            return Err(ApiError::bad_request(ALREADY_ADDED));
        }

        tracing::info!(user_id, recipe_id, list = self.label(), "recipe added");
        Ok((StatusCode::CREATED, Json(RecipeShort::from(&recipe))))
    }

    pub fn remove(self, pool: &DbPool, user_id: i32, recipe_id: i32) -> ApiResult<StatusCode> {
        let mut conn = pool.get()?;

        let recipe_id: i32 = recipes::table
            .find(recipe_id)
            .select(recipes::id)
            .first(&mut conn)?;

        if !self.delete(&mut conn, user_id, recipe_id)? {
            return Err(ApiError::bad_request(NOT_IN_LIST));
        }

        tracing::info!(user_id, recipe_id, list = self.label(), "recipe removed");
        Ok(StatusCode::NO_CONTENT)
    }
}
