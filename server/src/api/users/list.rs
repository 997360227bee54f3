use crate::api::{paginate, query_pairs, split_counted, DetailResponse, Paginated};
use crate::auth::MaybeUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::User;
use crate::projections::{render_users, UserView};
use crate::raw_sql::count_over;
use crate::schema::users;
use axum::{
    extract::{RawQuery, State},
    Json,
};
use diesel::pg::Pg;
use diesel::prelude::*;
use foodgram_core::PageRequest;
use std::sync::Arc;

/// Most recently joined first.
fn newest_first() -> users::BoxedQuery<'static, Pg> {
    users::table
        .order((users::date_joined.desc(), users::id.desc()))
        .into_boxed()
}

#[utoipa::path(
    get,
    path = "/api/users/",
    tag = "users",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number (default: 1)"),
        ("limit" = Option<i64>, Query, description = "Page size (default: 6, max: 100)")
    ),
    responses(
        (status = 200, description = "Page of users, newest first", body = Paginated<UserView>),
        (status = 404, description = "Invalid page", body = DetailResponse)
    )
)]
pub async fn list_users(
    viewer: MaybeUser,
    State(pool): State<Arc<DbPool>>,
    RawQuery(raw): RawQuery,
) -> ApiResult<Json<Paginated<UserView>>> {
    let pairs = query_pairs(raw.as_deref());
    let request = PageRequest::from_pairs(pairs.iter().map(|(k, v)| (k, v)))?;

    let mut conn = pool.get()?;

    let rows: Vec<(User, i64)> = newest_first()
        .select((User::as_select(), count_over()))
        .limit(request.limit)
        .offset(request.offset())
        .load(&mut conn)?;
    let (page_users, count) = split_counted(request, rows)?;

    let results = render_users(&mut conn, viewer.viewer(), &page_users)?;
    Ok(Json(paginate(request, count, results, "/api/users/", &pairs)?))
}
