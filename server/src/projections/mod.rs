//! Response shapes and the loaders that assemble them from rows.

pub mod recipes;
pub mod users;

pub use recipes::{render_recipe, render_recipes, IngredientLine, RecipeShort, RecipeView};
pub use users::{render_subscriptions, render_users, SubscriptionView, UserView};
