use crate::api::{DetailResponse, Json, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::{NewTag, Tag};
use crate::schema::tags;
use axum::{extract::State, http::StatusCode};
use diesel::prelude::*;
use foodgram_core::policy::check_catalog;
use foodgram_core::validation::{validate_tag, TagDraft, WriteMode};
use foodgram_core::Access;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Body for create and partial update
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TagWrite {
    pub name: Option<String>,
    /// `#RGB` or `#RRGGBB`
    pub color: Option<String>,
    pub slug: Option<String>,
}

impl TagWrite {
    pub fn draft(&self) -> TagDraft<'_> {
        TagDraft {
            name: self.name.as_deref().map(str::trim),
            color: self.color.as_deref().map(str::trim),
            slug: self.slug.as_deref().map(str::trim),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/tags/",
    tag = "tags",
    request_body(content = TagWrite, example = json!({"name": "Brunch", "color": "#FFAA00", "slug": "brunch"})),
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 400, description = "Invalid or duplicate fields", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = DetailResponse),
        (status = 403, description = "Staff only", body = DetailResponse)
    ),
    security(
        ("token_auth" = [])
    )
)]
pub async fn create_tag(
    auth: AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<TagWrite>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    check_catalog(Access::Write, Some(&auth.principal()))?;

    let draft = request.draft();
    validate_tag(&draft, WriteMode::Create)?;

    let mut conn = pool.get()?;
    let tag: Tag = diesel::insert_into(tags::table)
        .values(NewTag {
            name: draft.name.unwrap_or_default(),
            color: draft.color.unwrap_or_default(),
            slug: draft.slug.unwrap_or_default(),
        })
        .returning(Tag::as_returning())
        .get_result(&mut conn)?;

    tracing::info!(tag_id = tag.id, slug = %tag.slug, "tag created");
    Ok((StatusCode::CREATED, Json(tag)))
}
