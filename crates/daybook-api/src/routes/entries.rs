use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use daybook_core::models::{EntryDraft, EntryId};
use daybook_core::search::EntryFilter;
use daybook_core::JournalEntry;
use serde::Deserialize;

use super::{parse_path_id, AppState, ViewerQuery};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    let limit = page.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let entries = state
        .journal
        .list_entries(&user.user_id, limit, page.offset.unwrap_or(0))
        .await?;
    Ok(Json(entries))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(draft): Json<EntryDraft>,
) -> Result<(StatusCode, Json<JournalEntry>), AppError> {
    let entry = state.journal.create_entry(&user.user_id, draft).await?;
    tracing::info!(
        endpoint = "entries_create",
        user = state.fingerprint(&user.user_id),
        words = entry.word_count,
        tags = entry.tags.len(),
        "Created journal entry"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(viewer): Query<ViewerQuery>,
    Json(filter): Json<EntryFilter>,
) -> Result<Json<Vec<JournalEntry>>, AppError> {
    let clock = viewer.clock(&state)?;
    let entries = state
        .journal
        .search_entries(&user.user_id, filter, &clock)
        .await?;
    Ok(Json(entries))
}

pub(super) async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<JournalEntry>, AppError> {
    let id: EntryId = parse_path_id(&id, "entry")?;
    state
        .journal
        .get_entry(&user.user_id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("entry {id}")))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(draft): Json<EntryDraft>,
) -> Result<Json<JournalEntry>, AppError> {
    let id: EntryId = parse_path_id(&id, "entry")?;
    let entry = state.journal.update_entry(&user.user_id, &id, draft).await?;
    Ok(Json(entry))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: EntryId = parse_path_id(&id, "entry")?;
    state.journal.delete_entry(&user.user_id, &id).await?;
    tracing::info!(
        endpoint = "entries_delete",
        user = state.fingerprint(&user.user_id),
        "Deleted journal entry"
    );
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<JournalEntry>, AppError> {
    let id: EntryId = parse_path_id(&id, "entry")?;
    let entry = state
        .journal
        .toggle_entry_favorite(&user.user_id, &id)
        .await?;
    Ok(Json(entry))
}
