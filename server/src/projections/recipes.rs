use crate::models::{Recipe, Tag, User};
use crate::projections::users::{load_subscriptions, UserView};
use crate::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, shopping_carts, tags, users,
};
use diesel::prelude::*;
use foodgram_core::{MembershipFlags, Memberships, Viewer};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Compact recipe used in favorite/cart confirmations and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecipeShort {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<&Recipe> for RecipeShort {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// An ingredient as it appears inside a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, Queryable)]
pub struct IngredientLine {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeView {
    pub id: i32,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<IngredientLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Everything needed to render a page of recipes, loaded in one query per
/// relation.
struct Related {
    tags: HashMap<i32, Vec<Tag>>,
    ingredients: HashMap<i32, Vec<IngredientLine>>,
    authors: HashMap<i32, UserView>,
    memberships: Memberships,
}

impl Related {
    fn load(conn: &mut PgConnection, viewer: Viewer, recipes: &[Recipe]) -> QueryResult<Self> {
        let ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let mut author_ids: Vec<i32> = recipes.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
        for (recipe_id, tag) in recipe_tags::table
            .inner_join(tags::table)
            .filter(recipe_tags::recipe_id.eq_any(&ids))
            .order((tags::name.asc(), tags::id.asc()))
            .select((recipe_tags::recipe_id, Tag::as_select()))
            .load::<(i32, Tag)>(conn)?
        {
            tags_by_recipe.entry(recipe_id).or_default().push(tag);
        }

        let mut ingredients_by_recipe: HashMap<i32, Vec<IngredientLine>> = HashMap::new();
        for (recipe_id, line) in recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(&ids))
            .order(recipe_ingredients::id.asc())
            .select((
                recipe_ingredients::recipe_id,
                (
                    ingredients::id,
                    ingredients::name,
                    ingredients::measurement_unit,
                    recipe_ingredients::amount,
                ),
            ))
            .load::<(i32, IngredientLine)>(conn)?
        {
            ingredients_by_recipe.entry(recipe_id).or_default().push(line);
        }

        let author_rows: Vec<User> = users::table
            .filter(users::id.eq_any(&author_ids))
            .select(User::as_select())
            .load(conn)?;
        let subscriptions = load_subscriptions(conn, viewer, &author_ids)?;
        let authors = author_rows
            .iter()
            .map(|u| (u.id, UserView::new(u, &subscriptions)))
            .collect();

        let memberships = Memberships::load(viewer, |user_id| {
            let favorited = favorites::table
                .filter(favorites::user_id.eq(user_id))
                .filter(favorites::recipe_id.eq_any(&ids))
                .select(favorites::recipe_id)
                .load(conn)?;
            let in_cart = shopping_carts::table
                .filter(shopping_carts::user_id.eq(user_id))
                .filter(shopping_carts::recipe_id.eq_any(&ids))
                .select(shopping_carts::recipe_id)
                .load(conn)?;
            Ok::<_, diesel::result::Error>((favorited, in_cart))
        })?;

        Ok(Self {
            tags: tags_by_recipe,
            ingredients: ingredients_by_recipe,
            authors,
            memberships,
        })
    }

    fn render(&mut self, recipe: Recipe) -> QueryResult<RecipeView> {
        let author = self
            .authors
            .get(&recipe.author_id)
            .cloned()
            .ok_or(diesel::result::Error::NotFound)?;
        let flags = self.memberships.flags(recipe.id);
        let tags = self.tags.remove(&recipe.id).unwrap_or_default();
        let ingredients = self.ingredients.remove(&recipe.id).unwrap_or_default();
        Ok(RecipeView::assemble(recipe, tags, author, ingredients, flags))
    }
}

impl RecipeView {
    pub fn assemble(
        recipe: Recipe,
        tags: Vec<Tag>,
        author: UserView,
        ingredients: Vec<IngredientLine>,
        flags: MembershipFlags,
    ) -> Self {
        Self {
            id: recipe.id,
            tags,
            author,
            ingredients,
            is_favorited: flags.is_favorited,
            is_in_shopping_cart: flags.is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Renders recipes in the given order through the full shape.
pub fn render_recipes(
    conn: &mut PgConnection,
    viewer: Viewer,
    recipes: Vec<Recipe>,
) -> QueryResult<Vec<RecipeView>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }
    let mut related = Related::load(conn, viewer, &recipes)?;
    recipes.into_iter().map(|r| related.render(r)).collect()
}

pub fn render_recipe(
    conn: &mut PgConnection,
    viewer: Viewer,
    recipe: Recipe,
) -> QueryResult<RecipeView> {
    render_recipes(conn, viewer, vec![recipe])?
        .pop()
        .ok_or(diesel::result::Error::NotFound)
}
