//! Database-free domain logic for the Foodgram backend.
//!
//! Everything here works on plain values so the rules can be exercised
//! without a live PostgreSQL instance. The server loads rows with diesel and
//! hands them to these functions.

pub mod error;
pub mod membership;
pub mod pagination;
pub mod password;
pub mod policy;
pub mod query;
pub mod seed;
pub mod shopping_list;
pub mod subscriptions;
pub mod validation;

pub use error::{LimitError, PageError, PolicyError, ShoppingListError, ValidationErrors};
pub use membership::{MembershipFlags, Memberships, Viewer};
pub use pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use policy::{Access, Principal};
pub use query::{IngredientQuery, RecipeQuery, TagFilter};
pub use shopping_list::{CartLine, ShoppingList, ShoppingListEntry};
pub use subscriptions::RecipesLimit;
