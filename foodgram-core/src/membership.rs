//! Per-viewer flags attached to recipe and user projections.

use serde::Serialize;
use std::collections::HashSet;

/// Who is looking at a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    User(i32),
}

impl Viewer {
    pub fn user_id(self) -> Option<i32> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MembershipFlags {
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// The viewer's favorite and cart recipe ids, restricted to the recipes being
/// rendered.
#[derive(Debug, Clone, Default)]
pub struct Memberships {
    favorites: HashSet<i32>,
    cart: HashSet<i32>,
}

impl Memberships {
    pub fn new(
        favorites: impl IntoIterator<Item = i32>,
        cart: impl IntoIterator<Item = i32>,
    ) -> Self {
        Self {
            favorites: favorites.into_iter().collect(),
            cart: cart.into_iter().collect(),
        }
    }

    /// Loads memberships for an authenticated viewer. For an anonymous viewer
    /// the loader is never called and every flag is `false`.
    pub fn load<E>(
        viewer: Viewer,
        loader: impl FnOnce(i32) -> Result<(Vec<i32>, Vec<i32>), E>,
    ) -> Result<Self, E> {
        match viewer {
            Viewer::Anonymous => Ok(Self::default()),
            Viewer::User(user_id) => {
                let (favorites, cart) = loader(user_id)?;
                Ok(Self::new(favorites, cart))
            }
        }
    }

    pub fn flags(&self, recipe_id: i32) -> MembershipFlags {
        MembershipFlags {
            is_favorited: self.favorites.contains(&recipe_id),
            is_in_shopping_cart: self.cart.contains(&recipe_id),
        }
    }
}

/// Authors the viewer follows, restricted to the users being rendered.
#[derive(Debug, Clone, Default)]
pub struct Subscriptions {
    authors: HashSet<i32>,
}

impl Subscriptions {
    pub fn load<E>(
        viewer: Viewer,
        loader: impl FnOnce(i32) -> Result<Vec<i32>, E>,
    ) -> Result<Self, E> {
        match viewer {
            Viewer::Anonymous => Ok(Self::default()),
            Viewer::User(user_id) => Ok(Self {
                authors: loader(user_id)?.into_iter().collect(),
            }),
        }
    }

    /// Everyone in `authors` is followed; used for the subscriptions list.
    pub fn all(authors: impl IntoIterator<Item = i32>) -> Self {
        Self {
            authors: authors.into_iter().collect(),
        }
    }

    pub fn is_subscribed(&self, author_id: i32) -> bool {
        self.authors.contains(&author_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn test_anonymous_never_loads() {
        let memberships = Memberships::load::<Infallible>(Viewer::Anonymous, |_| {
            panic!("anonymous viewers must not hit the store")
        })
        .unwrap();
        assert_eq!(memberships.flags(1), MembershipFlags::default());
    }

    #[test]
    fn test_flags_for_user() {
        let memberships =
            Memberships::load::<Infallible>(Viewer::User(7), |id| {
                assert_eq!(id, 7);
                Ok((vec![1, 2], vec![2, 3]))
            })
            .unwrap();

        assert_eq!(
            memberships.flags(1),
            MembershipFlags {
                is_favorited: true,
                is_in_shopping_cart: false
            }
        );
        assert_eq!(
            memberships.flags(2),
            MembershipFlags {
                is_favorited: true,
                is_in_shopping_cart: true
            }
        );
        assert_eq!(
            memberships.flags(3),
            MembershipFlags {
                is_favorited: false,
                is_in_shopping_cart: true
            }
        );
        assert_eq!(memberships.flags(4), MembershipFlags::default());
    }

    #[test]
    fn test_loader_error_propagates() {
        let result = Memberships::load(Viewer::User(1), |_| Err("db down"));
        assert_eq!(result.unwrap_err(), "db down");
    }

    #[test]
    fn test_subscriptions_anonymous() {
        let subs = Subscriptions::load::<Infallible>(Viewer::Anonymous, |_| Ok(vec![1])).unwrap();
        assert!(!subs.is_subscribed(1));
    }

    #[test]
    fn test_subscriptions_user() {
        let subs = Subscriptions::load::<Infallible>(Viewer::User(5), |_| Ok(vec![1, 9])).unwrap();
        assert!(subs.is_subscribed(9));
        assert!(!subs.is_subscribed(5));
    }
}
