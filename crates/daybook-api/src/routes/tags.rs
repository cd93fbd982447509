use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use daybook_core::models::{split_tag_text, Tag, TagId, TagUsage};
use serde::Deserialize;

use super::{parse_path_id, AppState};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub(crate) struct NewTag {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SuggestQuery {
    #[serde(default)]
    q: String,
    /// Comma separated names already on the entry
    #[serde(default)]
    exclude: String,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<TagUsage>>, AppError> {
    Ok(Json(state.journal.list_tags(&user.user_id).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<NewTag>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let tag = state.journal.create_tag(&user.user_id, &body.name).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub(super) async fn suggest(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<Tag>>, AppError> {
    let exclude = split_tag_text(&query.exclude);
    let tags = state
        .journal
        .suggest_tags(&user.user_id, &query.q, &exclude)
        .await?;
    Ok(Json(tags))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: TagId = parse_path_id(&id, "tag")?;
    state.journal.delete_tag(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
