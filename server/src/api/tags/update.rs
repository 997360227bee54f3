use crate::api::{DetailResponse, Json, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::{Tag, TagChanges};
use crate::schema::tags;
use axum::extract::{Path, State};
use diesel::prelude::*;
use foodgram_core::policy::check_catalog;
use foodgram_core::validation::{validate_tag, WriteMode};
use foodgram_core::Access;
use std::sync::Arc;

use super::create::TagWrite;

#[utoipa::path(
    patch,
    path = "/api/tags/{id}/",
    tag = "tags",
    params(
        ("id" = i32, Path, description = "Tag ID")
    ),
    request_body = TagWrite,
    responses(
        (status = 200, description = "Tag updated", body = Tag),
        (status = 400, description = "Invalid or duplicate fields", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 403, description = "Staff only", body = DetailResponse),
        (status = 404, description = "Tag not found", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn update_tag(
    auth: AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(request): Json<TagWrite>,
) -> ApiResult<Json<Tag>> {
    check_catalog(Access::Write, Some(&auth.principal()))?;

    let draft = request.draft();
    validate_tag(&draft, WriteMode::Update)?;

    let mut conn = pool.get()?;
    let changes = TagChanges {
        name: draft.name,
        color: draft.color,
        slug: draft.slug,
    };

    let tag: Tag = if changes.name.is_none() && changes.color.is_none() && changes.slug.is_none() {
        tags::table
            .find(id)
            .select(Tag::as_select())
            .first(&mut conn)?
    } else {
        diesel::update(tags::table.find(id))
            .set(&changes)
            .returning(Tag::as_returning())
            .get_result(&mut conn)?
    };

    tracing::info!(tag_id = tag.id, "tag updated");
    Ok(Json(tag))
}
