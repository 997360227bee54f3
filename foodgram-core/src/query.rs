//! Listing filters parsed from the raw query string.
//!
//! The query string is taken as key/value pairs rather than through a
//! struct deserializer because `tags` may repeat.

use crate::error::ValidationErrors;
use crate::membership::Viewer;
use std::collections::HashSet;

/// OR-filter over tag slugs. An empty filter leaves the listing unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    slugs: Vec<String>,
}

impl TagFilter {
    /// Keeps the first occurrence of each slug and drops empty values.
    pub fn from_slugs<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let slugs = slugs
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.is_empty())
            .filter(|s| seen.insert(s.clone()))
            .collect();
        Self { slugs }
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    pub fn slugs(&self) -> &[String] {
        &self.slugs
    }
}

/// Accepts the usual query-string spellings of a boolean.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Filters accepted by the recipe listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    pub author: Option<i32>,
    pub tags: TagFilter,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeQuery {
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationErrors>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut errors = ValidationErrors::new();
        let mut query = RecipeQuery::default();
        let mut slugs = Vec::new();

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "author" if !value.is_empty() => match value.parse::<i32>() {
                    Ok(id) => query.author = Some(id),
                    Err(_) => errors.add("author", "Enter a valid user id."),
                },
                "tags" => slugs.push(value.to_string()),
                "is_favorited" if !value.is_empty() => match parse_bool(value) {
                    Some(b) => query.is_favorited = Some(b),
                    None => errors.add("is_favorited", "Enter a valid boolean."),
                },
                "is_in_shopping_cart" if !value.is_empty() => match parse_bool(value) {
                    Some(b) => query.is_in_shopping_cart = Some(b),
                    None => errors.add("is_in_shopping_cart", "Enter a valid boolean."),
                },
                _ => {}
            }
        }

        query.tags = TagFilter::from_slugs(slugs);
        errors.into_result().map(|()| query)
    }

    /// The user whose favorites restrict the listing. Only a truthy flag from
    /// an authenticated viewer has an effect.
    pub fn favorited_by(&self, viewer: Viewer) -> Option<i32> {
        match self.is_favorited {
            Some(true) => viewer.user_id(),
            _ => None,
        }
    }

    /// Same as [`RecipeQuery::favorited_by`] for the shopping cart.
    pub fn in_cart_of(&self, viewer: Viewer) -> Option<i32> {
        match self.is_in_shopping_cart {
            Some(true) => viewer.user_id(),
            _ => None,
        }
    }
}

/// Filter accepted by the ingredient listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

impl IngredientQuery {
    /// Builds a `LIKE` pattern for a case-insensitive "contains" match, with
    /// wildcard characters in the input escaped.
    pub fn name_pattern(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                format!(
                    "%{}%",
                    name.replace('\\', "\\\\")
                        .replace('%', "\\%")
                        .replace('_', "\\_")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_filter_dedups_and_drops_empty() {
        let filter = TagFilter::from_slugs(["lunch", "", "breakfast", "lunch"]);
        assert_eq!(filter.slugs(), ["lunch", "breakfast"]);
    }

    #[test]
    fn test_default_filter_is_empty() {
        assert!(TagFilter::default().is_empty());
        assert!(TagFilter::from_slugs([""]).is_empty());
    }

    #[test]
    fn test_recipe_query_parses_repeated_tags() {
        let query = RecipeQuery::from_pairs([
            ("tags", "breakfast"),
            ("tags", "dinner"),
            ("author", "3"),
            ("is_favorited", "1"),
            ("is_in_shopping_cart", "false"),
            ("page", "2"),
        ])
        .unwrap();

        assert_eq!(query.author, Some(3));
        assert_eq!(query.tags.slugs(), ["breakfast", "dinner"]);
        assert_eq!(query.is_favorited, Some(true));
        assert_eq!(query.is_in_shopping_cart, Some(false));
    }

    #[test]
    fn test_recipe_query_rejects_garbage() {
        let errors =
            RecipeQuery::from_pairs([("author", "bob"), ("is_favorited", "maybe")]).unwrap_err();
        assert!(errors.contains("author"));
        assert!(errors.contains("is_favorited"));
    }

    #[test]
    fn test_flags_need_authenticated_viewer() {
        let query = RecipeQuery::from_pairs([("is_favorited", "1"), ("is_in_shopping_cart", "1")])
            .unwrap();
        assert_eq!(query.favorited_by(Viewer::Anonymous), None);
        assert_eq!(query.in_cart_of(Viewer::Anonymous), None);
        assert_eq!(query.favorited_by(Viewer::User(4)), Some(4));
        assert_eq!(query.in_cart_of(Viewer::User(4)), Some(4));
    }

    #[test]
    fn test_false_flag_has_no_effect() {
        let query = RecipeQuery::from_pairs([("is_favorited", "0")]).unwrap();
        assert_eq!(query.favorited_by(Viewer::User(4)), None);
    }

    #[test]
    fn test_ingredient_name_pattern_escapes_wildcards() {
        let query = IngredientQuery {
            name: Some(" 100%_sugar ".to_string()),
        };
        assert_eq!(query.name_pattern().as_deref(), Some("%100\\%\\_sugar%"));
        assert_eq!(IngredientQuery::default().name_pattern(), None);
    }
}
