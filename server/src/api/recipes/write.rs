//! Write shape shared by create and update, and the persistence steps both
//! run inside their transaction.

use crate::error::ApiResult;
use crate::models::{NewRecipe, NewRecipeIngredient, NewRecipeTag};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};
use diesel::dsl::exists;
use diesel::prelude::*;
use foodgram_core::validation::{
    check_references, unique_violation_message, IngredientAmount, RecipeDraft, MAX_SMALL_VALUE,
};
use foodgram_core::ValidationErrors;
use serde::Deserialize;
use std::collections::HashSet;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct IngredientAmountInput {
    /// Ingredient ID
    pub id: i32,
    pub amount: i64,
}

/// Every field is optional so the same body serves PATCH; create requires
/// them all.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipeWrite {
    /// Tag IDs
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmountInput>>,
    pub name: Option<String>,
    /// Opaque image reference
    pub image: Option<String>,
    pub text: Option<String>,
    /// Minutes
    pub cooking_time: Option<i64>,
}

impl RecipeWrite {
    pub fn amounts(&self) -> Option<Vec<IngredientAmount>> {
        self.ingredients.as_ref().map(|entries| {
            entries
                .iter()
                .map(|e| IngredientAmount {
                    id: e.id,
                    amount: e.amount,
                })
                .collect()
        })
    }

    pub fn draft<'a>(&'a self, amounts: Option<&'a [IngredientAmount]>) -> RecipeDraft<'a> {
        RecipeDraft {
            name: self.name.as_deref().map(str::trim),
            image: self.image.as_deref(),
            text: self.text.as_deref(),
            cooking_time: self.cooking_time,
            tags: self.tags.as_deref(),
            ingredients: amounts,
        }
    }
}

/// Fits a validated amount or cooking time into its column.
pub fn small(value: i64) -> i32 {
    value.clamp(0, MAX_SMALL_VALUE) as i32
}

/// Row for a validated create draft.
pub fn new_recipe<'a>(draft: &RecipeDraft<'a>, author_id: i32) -> NewRecipe<'a> {
    NewRecipe {
        author_id,
        name: draft.name.unwrap_or_default(),
        image: draft.image.unwrap_or_default(),
        text: draft.text.unwrap_or_default(),
        cooking_time: small(draft.cooking_time.unwrap_or_default()),
    }
}

pub fn tag_rows(recipe_id: i32, tag_ids: &[i32]) -> Vec<NewRecipeTag> {
    tag_ids
        .iter()
        .map(|&tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect()
}

pub fn ingredient_rows(recipe_id: i32, entries: &[IngredientAmount]) -> Vec<NewRecipeIngredient> {
    entries
        .iter()
        .map(|e| NewRecipeIngredient {
            recipe_id,
            ingredient_id: e.id,
            amount: small(e.amount),
        })
        .collect()
}

/// Every submitted tag and ingredient id must exist.
pub fn check_exist(conn: &mut PgConnection, draft: &RecipeDraft<'_>) -> ApiResult<()> {
    let mut errors = ValidationErrors::new();

    if let Some(tag_ids) = draft.tags {
        let existing: HashSet<i32> = tags::table
            .filter(tags::id.eq_any(tag_ids))
            .select(tags::id)
            .load::<i32>(conn)?
            .into_iter()
            .collect();
        check_references(&mut errors, "tags", "Tag", tag_ids.iter().copied(), &existing);
    }

    if let Some(entries) = draft.ingredients {
        let ids: Vec<i32> = entries.iter().map(|e| e.id).collect();
        let existing: HashSet<i32> = ingredients::table
            .filter(ingredients::id.eq_any(&ids))
            .select(ingredients::id)
            .load::<i32>(conn)?
            .into_iter()
            .collect();
        check_references(&mut errors, "ingredients", "Ingredient", ids, &existing);
    }

    Ok(errors.into_result()?)
}

/// Pre-check for the (name, author) constraint. `except` skips the recipe
/// being updated.
pub fn check_name_free(
    conn: &mut PgConnection,
    author_id: i32,
    name: &str,
    except: Option<i32>,
) -> ApiResult<()> {
    let mut query = recipes::table
        .filter(recipes::author_id.eq(author_id))
        .filter(recipes::name.eq(name))
        .into_boxed();
    if let Some(id) = except {
        query = query.filter(recipes::id.ne(id));
    }
    let taken: bool = diesel::select(exists(query)).get_result(conn)?;

    match unique_violation_message("unique_author_recipe").filter(|_| taken) {
        Some((field, message)) => Err(ValidationErrors::single(field, message).into()),
        None => Ok(()),
    }
}

pub fn replace_tags(conn: &mut PgConnection, recipe_id: i32, tag_ids: &[i32]) -> QueryResult<()> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id))).execute(conn)?;
    diesel::insert_into(recipe_tags::table)
        .values(&tag_rows(recipe_id, tag_ids))
        .execute(conn)?;
    Ok(())
}

pub fn replace_ingredients(
    conn: &mut PgConnection,
    recipe_id: i32,
    entries: &[IngredientAmount],
) -> QueryResult<()> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    diesel::insert_into(recipe_ingredients::table)
        .values(&ingredient_rows(recipe_id, entries))
        .execute(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodgram_core::validation::{validate_recipe, WriteMode};

    fn body(json: serde_json::Value) -> RecipeWrite {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_full_body_passes_create_validation() {
        let write = body(serde_json::json!({
            "tags": [1, 2],
            "ingredients": [{"id": 5, "amount": 200}, {"id": 6, "amount": 3}],
            "name": "  Pancakes ",
            "image": "recipes/pancakes.png",
            "text": "Whisk, rest, fry.",
            "cooking_time": 20
        }));
        let amounts = write.amounts();
        let draft = write.draft(amounts.as_deref());
        assert_eq!(draft.name, Some("Pancakes"));
        assert!(validate_recipe(&draft, WriteMode::Create).is_ok());
    }

    #[test]
    fn test_partial_body_is_a_valid_patch() {
        let write = body(serde_json::json!({"cooking_time": 5}));
        let amounts = write.amounts();
        let draft = write.draft(amounts.as_deref());
        assert!(validate_recipe(&draft, WriteMode::Update).is_ok());
        assert!(validate_recipe(&draft, WriteMode::Create).is_err());
    }

    #[test]
    fn test_present_lists_validated_on_patch() {
        let write = body(serde_json::json!({
            "tags": [],
            "ingredients": [{"id": 5, "amount": 0}, {"id": 5, "amount": 1}]
        }));
        let amounts = write.amounts();
        let draft = write.draft(amounts.as_deref());
        let errors = validate_recipe(&draft, WriteMode::Update).unwrap_err();
        assert!(errors.contains("tags"));
        assert_eq!(errors.messages("ingredients").len(), 2);
    }

    /// Write shape in, rows out, rows rendered back through the full shape.
    #[test]
    fn test_write_shape_round_trips_to_full_shape() {
        use crate::models::{Recipe, Tag};
        use crate::projections::{IngredientLine, RecipeView, UserView};
        use foodgram_core::MembershipFlags;

        let write = body(serde_json::json!({
            "tags": [2, 1],
            "ingredients": [{"id": 5, "amount": 200}, {"id": 6, "amount": 3}],
            "name": "Pancakes",
            "image": "recipes/pancakes.png",
            "text": "Whisk, rest, fry.",
            "cooking_time": 20
        }));
        let amounts = write.amounts();
        let draft = write.draft(amounts.as_deref());
        validate_recipe(&draft, WriteMode::Create).unwrap();

        let row = new_recipe(&draft, 1);
        let stored = Recipe {
            id: 9,
            author_id: row.author_id,
            name: row.name.to_string(),
            image: row.image.to_string(),
            text: row.text.to_string(),
            cooking_time: row.cooking_time,
            created_at: chrono::Utc::now(),
        };

        let tag_catalog = [
            Tag { id: 1, name: "Breakfast".into(), color: "#E26C2D".into(), slug: "breakfast".into() },
            Tag { id: 2, name: "Lunch".into(), color: "#008000".into(), slug: "dinner".into() },
        ];
        let tags: Vec<Tag> = tag_rows(stored.id, draft.tags.unwrap_or_default())
            .iter()
            .filter_map(|link| tag_catalog.iter().find(|t| t.id == link.tag_id).cloned())
            .collect();

        let ingredient_catalog = [(5, "flour", "g"), (6, "eggs", "pcs")];
        let ingredients: Vec<IngredientLine> =
            ingredient_rows(stored.id, draft.ingredients.unwrap_or_default())
                .iter()
                .filter_map(|link| {
                    ingredient_catalog
                        .iter()
                        .find(|(id, _, _)| *id == link.ingredient_id)
                        .map(|(id, name, unit)| IngredientLine {
                            id: *id,
                            name: name.to_string(),
                            measurement_unit: unit.to_string(),
                            amount: link.amount,
                        })
                })
                .collect();

        let author = UserView {
            email: "ann@example.com".into(),
            id: 1,
            username: "ann".into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            is_subscribed: false,
        };
        let view = RecipeView::assemble(stored, tags, author, ingredients, MembershipFlags::default());
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value["name"], "Pancakes");
        assert_eq!(value["image"], "recipes/pancakes.png");
        assert_eq!(value["text"], "Whisk, rest, fry.");
        assert_eq!(value["cooking_time"], 20);
        assert_eq!(value["author"]["id"], 1);
        assert_eq!(
            value["tags"],
            serde_json::json!([
                {"id": 2, "name": "Lunch", "color": "#008000", "slug": "dinner"},
                {"id": 1, "name": "Breakfast", "color": "#E26C2D", "slug": "breakfast"}
            ])
        );
        assert_eq!(
            value["ingredients"],
            serde_json::json!([
                {"id": 5, "name": "flour", "measurement_unit": "g", "amount": 200},
                {"id": 6, "name": "eggs", "measurement_unit": "pcs", "amount": 3}
            ])
        );
        assert_eq!(value["is_favorited"], false);
    }

    #[test]
    fn test_small_clamps() {
        assert_eq!(small(20), 20);
        assert_eq!(small(100_000), 32767);
    }
}
