use crate::models::{Recipe, User};
use crate::projections::recipes::RecipeShort;
use crate::schema::{follows, recipes};
use diesel::prelude::*;
use foodgram_core::membership::Subscriptions;
use foodgram_core::{RecipesLimit, Viewer};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the caller follows this user; always false when anonymous
    pub is_subscribed: bool,
}

impl UserView {
    pub fn new(user: &User, subscriptions: &Subscriptions) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed: subscriptions.is_subscribed(user.id),
        }
    }
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

/// Which of `author_ids` the viewer follows.
pub fn load_subscriptions(
    conn: &mut PgConnection,
    viewer: Viewer,
    author_ids: &[i32],
) -> QueryResult<Subscriptions> {
    Subscriptions::load(viewer, |user_id| {
        follows::table
            .filter(follows::user_id.eq(user_id))
            .filter(follows::author_id.eq_any(author_ids))
            .select(follows::author_id)
            .load(conn)
    })
}

pub fn render_users(
    conn: &mut PgConnection,
    viewer: Viewer,
    users: &[User],
) -> QueryResult<Vec<UserView>> {
    let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
    let subscriptions = load_subscriptions(conn, viewer, &ids)?;
    Ok(users
        .iter()
        .map(|u| UserView::new(u, &subscriptions))
        .collect())
}

/// Renders authors the viewer follows. Recipes come newest first and are
/// capped by `limit`; `recipes_count` is always the full total.
pub fn render_subscriptions(
    conn: &mut PgConnection,
    authors: &[User],
    limit: RecipesLimit,
) -> QueryResult<Vec<SubscriptionView>> {
    let ids: Vec<i32> = authors.iter().map(|u| u.id).collect();

    let mut by_author: HashMap<i32, Vec<Recipe>> = HashMap::new();
    for recipe in recipes::table
        .filter(recipes::author_id.eq_any(&ids))
        .order((recipes::created_at.desc(), recipes::id.desc()))
        .select(Recipe::as_select())
        .load(conn)?
    {
        by_author.entry(recipe.author_id).or_default().push(recipe);
    }

    let subscriptions = Subscriptions::all(ids);
    Ok(authors
        .iter()
        .map(|author| {
            let recipes = by_author.remove(&author.id).unwrap_or_default();
            let recipes_count = recipes.len() as i64;
            SubscriptionView {
                user: UserView::new(author, &subscriptions),
                recipes: limit
                    .apply(recipes)
                    .iter()
                    .map(RecipeShort::from)
                    .collect(),
                recipes_count,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn user(id: i32) -> User {
        User {
            id,
            email: format!("u{id}@example.com"),
            username: format!("user{id}"),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            password_hash: "x".into(),
            is_staff: false,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_user_view_shape() {
        let view = UserView::new(&user(3), &Subscriptions::all([3]));
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "email": "u3@example.com",
                "id": 3,
                "username": "user3",
                "first_name": "Ann",
                "last_name": "Lee",
                "is_subscribed": true,
            })
        );
    }

    #[test]
    fn test_subscription_view_flattens_user() {
        let view = SubscriptionView {
            user: UserView::new(&user(4), &Subscriptions::all([4])),
            recipes: vec![],
            recipes_count: 7,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["id"], 4);
        assert_eq!(value["is_subscribed"], true);
        assert_eq!(value["recipes_count"], 7);
        assert_eq!(value["recipes"], json!([]));
    }
}
