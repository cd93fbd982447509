use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use daybook_core::db::DEFAULT_QUICK_NOTE_LIMIT;
use daybook_core::models::{QuickNote, QuickNoteId};
use serde::Deserialize;

use super::{parse_path_id, AppState};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;

const MAX_NOTES: usize = 100;

#[derive(Debug, Deserialize)]
pub(crate) struct NoteBody {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NotesQuery {
    limit: Option<usize>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<NotesQuery>,
) -> Result<Json<Vec<QuickNote>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_QUICK_NOTE_LIMIT)
        .clamp(1, MAX_NOTES);
    Ok(Json(state.journal.list_notes(&user.user_id, limit).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<NoteBody>,
) -> Result<(StatusCode, Json<QuickNote>), AppError> {
    let note = state.journal.create_note(&user.user_id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> Result<Json<QuickNote>, AppError> {
    let id: QuickNoteId = parse_path_id(&id, "note")?;
    let note = state
        .journal
        .update_note(&user.user_id, &id, &body.content)
        .await?;
    Ok(Json(note))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: QuickNoteId = parse_path_id(&id, "note")?;
    state.journal.delete_note(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<QuickNote>, AppError> {
    let id: QuickNoteId = parse_path_id(&id, "note")?;
    let note = state.journal.toggle_note_favorite(&user.user_id, &id).await?;
    Ok(Json(note))
}
