//! Behavioural checks across modules: the guarantees the API relies on,
//! exercised against in-memory data instead of a database.

use foodgram_core::shopping_list::{CartLine, ShoppingList};
use foodgram_core::validation::{
    validate_follow, validate_recipe, IngredientAmount, RecipeDraft, WriteMode,
};
use foodgram_core::{Memberships, RecipeQuery, TagFilter, Viewer};
use std::convert::Infallible;

#[test]
fn test_no_tags_param_is_unfiltered() {
    let query = RecipeQuery::from_pairs([("page", "1")]).unwrap();
    assert!(query.tags.is_empty());
}

#[test]
fn test_repeated_tags_param_collects_each_slug_once() {
    let query = RecipeQuery::from_pairs([
        ("tags", "breakfast"),
        ("tags", "dinner"),
        ("tags", "breakfast"),
    ])
    .unwrap();
    assert_eq!(query.tags, TagFilter::from_slugs(["breakfast", "dinner"]));
}

#[test]
fn test_shopping_list_sums_flour_across_recipes() {
    let recipe_a = vec![CartLine::new("flour", "g", 200)];
    let recipe_b = vec![CartLine::new("flour", "g", 300)];

    let list = ShoppingList::aggregate(2, recipe_a.into_iter().chain(recipe_b)).unwrap();

    assert_eq!(list.entries().len(), 1);
    assert_eq!(list.entries()[0].name, "flour");
    assert_eq!(list.entries()[0].total_amount, 500);
    assert!(list.render().contains("- flour, (g) - 500\n"));
}

#[test]
fn test_shopping_list_ignores_recipe_order() {
    let lines = vec![
        CartLine::new("flour", "g", 200),
        CartLine::new("milk", "ml", 300),
        CartLine::new("eggs", "pcs", 2),
        CartLine::new("flour", "g", 300),
        CartLine::new("milk", "ml", 50),
    ];
    let mut reversed = lines.clone();
    reversed.reverse();

    let forward = ShoppingList::aggregate(3, lines).unwrap();
    let backward = ShoppingList::aggregate(3, reversed).unwrap();
    assert_eq!(forward, backward);
    assert_eq!(forward.render(), backward.render());
}

#[test]
fn test_anonymous_flags_are_false_whatever_is_stored() {
    let stored_favorites = vec![1, 2, 3];
    let stored_cart = vec![1, 2, 3];

    let memberships = Memberships::load::<Infallible>(Viewer::Anonymous, |_| {
        Ok((stored_favorites.clone(), stored_cart.clone()))
    })
    .unwrap();

    for id in 1..=3 {
        let flags = memberships.flags(id);
        assert!(!flags.is_favorited);
        assert!(!flags.is_in_shopping_cart);
    }
}

#[test]
fn test_follow_rejections_differ() {
    let own = validate_follow(10, 10, false).unwrap_err();
    let twice = validate_follow(10, 11, true).unwrap_err();
    assert_ne!(
        serde_json::to_value(&own).unwrap(),
        serde_json::to_value(&twice).unwrap()
    );
}

#[test]
fn test_valid_write_shape_passes() {
    let tags = [1, 2];
    let ingredients = [
        IngredientAmount { id: 5, amount: 200 },
        IngredientAmount { id: 6, amount: 1 },
    ];
    let draft = RecipeDraft {
        name: Some("Pancakes"),
        image: Some("recipes/pancakes.png"),
        text: Some("Whisk, rest, fry."),
        cooking_time: Some(20),
        tags: Some(&tags),
        ingredients: Some(&ingredients),
    };
    assert!(validate_recipe(&draft, WriteMode::Create).is_ok());
}
