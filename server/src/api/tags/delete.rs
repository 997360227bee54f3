use crate::api::DetailResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ApiError, ApiResult};
use crate::schema::tags;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use foodgram_core::policy::check_catalog;
use foodgram_core::Access;
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/tags/{id}/",
    tag = "tags",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 403, description = "Staff only", body = DetailResponse),
        (status = 404, description = "Tag not found", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn delete_tag(
    auth: AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    check_catalog(Access::Write, Some(&auth.principal()))?;

    let mut conn = pool.get()?;
    let deleted = diesel::delete(tags::table.find(id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(ApiError::not_found());
    }

    tracing::info!(tag_id = id, "tag deleted");
    Ok(StatusCode::NO_CONTENT)
}
