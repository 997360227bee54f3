use crate::api::{
    paginate, query_pairs, split_counted, DetailResponse, Paginated, ValidationErrorResponse,
};
use crate::auth::MaybeUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::Recipe;
use crate::projections::{render_recipes, RecipeView};
use crate::raw_sql::count_over;
use crate::schema::{favorites, recipe_tags, recipes, shopping_carts, tags};
use axum::{
    extract::{RawQuery, State},
    Json,
};
use diesel::pg::Pg;
use diesel::prelude::*;
use foodgram_core::{PageRequest, RecipeQuery, Viewer};
use std::sync::Arc;

/// Applies the listing filters. Every filter is an `IN (SELECT ...)` on the
/// recipe id, so a recipe matching several tags is still one row.
fn filtered(filters: &RecipeQuery, viewer: Viewer) -> recipes::BoxedQuery<'static, Pg> {
    let mut query = recipes::table.into_boxed();

    if let Some(author_id) = filters.author {
        query = query.filter(recipes::author_id.eq(author_id));
    }
    if !filters.tags.is_empty() {
        let tagged = recipe_tags::table
            .inner_join(tags::table)
            .filter(tags::slug.eq_any(filters.tags.slugs().to_vec()))
            .select(recipe_tags::recipe_id);
        query = query.filter(recipes::id.eq_any(tagged));
    }
    if let Some(user_id) = filters.favorited_by(viewer) {
        let favorited = favorites::table
            .filter(favorites::user_id.eq(user_id))
            .select(favorites::recipe_id);
        query = query.filter(recipes::id.eq_any(favorited));
    }
    if let Some(user_id) = filters.in_cart_of(viewer) {
        let in_cart = shopping_carts::table
            .filter(shopping_carts::user_id.eq(user_id))
            .select(shopping_carts::recipe_id);
        query = query.filter(recipes::id.eq_any(in_cart));
    }
    query
}

#[utoipa::path(
    get,
    path = "/api/recipes/",
    tag = "recipes",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number (default: 1)"),
        ("limit" = Option<i64>, Query, description = "Page size (default: 6, max: 100)"),
        ("author" = Option<i32>, Query, description = "Only recipes by this user"),
        ("tags" = Option<Vec<String>>, Query, description = "Tag slug; repeat for any-of matching"),
        ("is_favorited" = Option<bool>, Query, description = "Only the caller's favorites"),
        ("is_in_shopping_cart" = Option<bool>, Query, description = "Only recipes in the caller's cart")
    ),
    responses(
        (status = 200, description = "Recipes, newest first", body = Paginated<RecipeView>),
        (status = 400, description = "Malformed filter", body = ValidationErrorResponse),
        (status = 404, description = "Invalid page", body = DetailResponse)
    )
)]
pub async fn list_recipes(
    user: MaybeUser,
    State(pool): State<Arc<DbPool>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Paginated<RecipeView>>> {
    let pairs = query_pairs(raw.as_deref());
    let request = PageRequest::from_pairs(pairs.iter().map(|(k, v)| (k, v)))?;
    let filters = RecipeQuery::from_pairs(pairs.iter().map(|(k, v)| (k, v)))?;
    let viewer = user.viewer();

    let mut conn = pool.get()?;

    let rows: Vec<(Recipe, i64)> = filtered(&filters, viewer)
        .select((Recipe::as_select(), count_over()))
        .order((recipes::created_at.desc(), recipes::id.desc()))
        .limit(request.limit)
        .offset(request.offset())
        .load(&mut conn)?;
    let (found, count) = split_counted(request, rows)?;

    let results = render_recipes(&mut conn, viewer, found)?;
    Ok(Json(paginate(request, count, results, "/api/recipes/", &pairs)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    fn sql(pairs: &[(&str, &str)], viewer: Viewer) -> String {
        let filters = RecipeQuery::from_pairs(pairs.iter().copied()).unwrap();
        debug_query::<Pg, _>(&filtered(&filters, viewer)).to_string()
    }

    #[test]
    fn test_no_filters() {
        let sql = sql(&[], Viewer::Anonymous);
        assert!(!sql.contains("WHERE"), "{sql}");
        assert_eq!(sql.matches(" FROM ").count(), 1, "{sql}");
    }

    #[test]
    fn test_tags_filter_is_one_subquery() {
        let sql = sql(&[("tags", "breakfast"), ("tags", "dinner")], Viewer::Anonymous);
        assert!(sql.contains(r#"FROM "recipes" WHERE"#), "{sql}");
        assert!(
            sql.contains(r#""recipes"."id" IN (SELECT "recipe_tags"."recipe_id" FROM"#),
            "{sql}"
        );
        // the join lives inside the subquery; the outer query never joins
        assert_eq!(sql.matches(" FROM ").count(), 2, "{sql}");
        assert!(sql.contains("breakfast") && sql.contains("dinner"), "{sql}");
    }

    #[test]
    fn test_membership_filters_need_a_user() {
        let pairs = [("is_favorited", "1"), ("is_in_shopping_cart", "1")];

        let anonymous = sql(&pairs, Viewer::Anonymous);
        assert!(!anonymous.contains("favorites"), "{anonymous}");
        assert!(!anonymous.contains("shopping_carts"), "{anonymous}");

        let user = sql(&pairs, Viewer::User(7));
        assert!(
            user.contains(r#""recipes"."id" IN (SELECT "favorites"."recipe_id" FROM"#),
            "{user}"
        );
        assert!(
            user.contains(r#""recipes"."id" IN (SELECT "shopping_carts"."recipe_id" FROM"#),
            "{user}"
        );
    }

    #[test]
    fn test_author_filter() {
        let sql = sql(&[("author", "3")], Viewer::Anonymous);
        assert!(sql.contains(r#""recipes"."author_id" = $1"#), "{sql}");
    }
}
