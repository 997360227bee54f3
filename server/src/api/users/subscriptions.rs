use crate::api::{
    paginate, query_pairs, split_counted, DetailResponse, Paginated, ValidationErrorResponse,
};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::User;
use crate::projections::{render_subscriptions, SubscriptionView};
use crate::raw_sql::count_over;
use crate::schema::{follows, users};
use axum::{
    extract::{RawQuery, State},
    Json,
};
use diesel::prelude::*;
use foodgram_core::{PageRequest, RecipesLimit};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/users/subscriptions/",
    tag = "users",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number (default: 1)"),
        ("limit" = Option<i64>, Query, description = "Page size (default: 6, max: 100)"),
        ("recipes_limit" = Option<i64>, Query, description = "Maximum number of recipes per author")
    ),
    responses(
        (status = 200, description = "Authors the caller follows", body = Paginated<SubscriptionView>),
        (status = 400, description = "Invalid recipes_limit", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 404, description = "Invalid page", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Paginated<SubscriptionView>>> {
    let pairs = query_pairs(raw.as_deref());
    let request = PageRequest::from_pairs(pairs.iter().map(|(k, v)| (k, v)))?;
    let limit = RecipesLimit::parse(
        pairs
            .iter()
            .find(|(k, _)| k == "recipes_limit")
            .map(|(_, v)| v.as_str()),
    )?;

    let mut conn = pool.get()?;

    let followed = follows::table
        .filter(follows::user_id.eq(user.id))
        .select(follows::author_id);
    let rows: Vec<(User, i64)> = users::table
        .filter(users::id.eq_any(followed))
        .order(users::id.asc())
        .select((User::as_select(), count_over()))
        .limit(request.limit)
        .offset(request.offset())
        .load(&mut conn)?;
    let (authors, count) = split_counted(request, rows)?;

    let results = render_subscriptions(&mut conn, &authors, limit)?;
    Ok(Json(paginate(
        request,
        count,
        results,
        "/api/users/subscriptions/",
        &pairs,
    )?))
}
