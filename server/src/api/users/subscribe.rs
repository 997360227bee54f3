use crate::api::{DetailResponse, ErrorsResponse, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ApiError, ApiResult, NOT_SUBSCRIBED};
use crate::models::{NewFollow, User};
use crate::projections::{render_subscriptions, SubscriptionView};
use crate::schema::{follows, users};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use diesel::dsl::exists;
use diesel::prelude::*;
use foodgram_core::validation::{validate_follow, DUPLICATE_FOLLOW_MESSAGE};
use foodgram_core::{RecipesLimit, ValidationErrors};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipesLimitParams {
    /// Maximum number of the author's recipes to embed
    pub recipes_limit: Option<String>,
}

impl RecipesLimitParams {
    pub fn parse(&self) -> Result<RecipesLimit, ApiError> {
        Ok(RecipesLimit::parse(self.recipes_limit.as_deref())?)
    }
}

fn find_author(conn: &mut PgConnection, id: i32) -> ApiResult<User> {
    Ok(users::table
        .find(id)
        .select(User::as_select())
        .first(conn)?)
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/subscribe/",
    tag = "users",
    params(
        ("id" = i32, Path, description = "Author ID"),
        RecipesLimitParams
    ),
    responses(
        (status = 201, description = "Subscribed", body = SubscriptionView),
        (status = 400, description = "Self or duplicate subscription", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 404, description = "Author not found", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn subscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Query(params): Query<RecipesLimitParams>,
) -> ApiResult<(StatusCode, Json<SubscriptionView>)> {
    let limit = params.parse()?;
    let mut conn = pool.get()?;
    let author = find_author(&mut conn, id)?;

    let already_following: bool = diesel::select(exists(
        follows::table
            .filter(follows::user_id.eq(user.id))
            .filter(follows::author_id.eq(author.id)),
    ))
    .get_result(&mut conn)?;
    validate_follow(user.id, author.id, already_following)?;

    // A concurrent duplicate loses on the unique pair and inserts nothing.
    let inserted = diesel::insert_into(follows::table)
        .values(NewFollow {
            user_id: user.id,
            author_id: author.id,
        })
        .on_conflict_do_nothing()
        .execute(&mut conn)?;
    if inserted == 0 {
        return Err(ValidationErrors::non_field(DUPLICATE_FOLLOW_MESSAGE).into());
    }

    tracing::info!(user_id = user.id, author_id = author.id, "subscription created");

    let view = render_subscriptions(&mut conn, std::slice::from_ref(&author), limit)?
        .pop()
        .ok_or_else(ApiError::not_found)?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/subscribe/",
    tag = "users",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Unsubscribed"),
        (status = 400, description = "Not subscribed", body = ErrorsResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 404, description = "Author not found", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let mut conn = pool.get()?;
    let author = find_author(&mut conn, id)?;

    let deleted = diesel::delete(
        follows::table
            .filter(follows::user_id.eq(user.id))
            .filter(follows::author_id.eq(author.id)),
    )
    .execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::bad_request(NOT_SUBSCRIBED));
    }

    tracing::info!(user_id = user.id, author_id = author.id, "subscription removed");
    Ok(StatusCode::NO_CONTENT)
}
