use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use daybook_core::models::{Todo, TodoId};
use daybook_core::search::TodoQuery;
use daybook_core::stats::TodoSummary;
use serde::Deserialize;

use super::{parse_path_id, AppState, ViewerQuery};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub(crate) struct TodoBody {
    task: String,
    #[serde(default)]
    deadline: Option<NaiveDate>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<TodoQuery>,
) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(state.journal.list_todos(&user.user_id, &query).await?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<TodoBody>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let todo = state
        .journal
        .create_todo(&user.user_id, &body.task, body.deadline)
        .await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub(super) async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<Json<TodoSummary>, AppError> {
    let clock = viewer.clock(&state)?;
    Ok(Json(state.journal.todo_summary(&user.user_id, &clock).await?))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<TodoBody>,
) -> Result<Json<Todo>, AppError> {
    let id: TodoId = parse_path_id(&id, "todo")?;
    let todo = state
        .journal
        .update_todo(&user.user_id, &id, &body.task, body.deadline)
        .await?;
    Ok(Json(todo))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: TodoId = parse_path_id(&id, "todo")?;
    state.journal.delete_todo(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn toggle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, AppError> {
    let id: TodoId = parse_path_id(&id, "todo")?;
    Ok(Json(state.journal.toggle_todo(&user.user_id, &id).await?))
}

#[cfg(test)]
mod tests {
    use daybook_core::search::{TodoSort, TodoStatus};
    use pretty_assertions::assert_eq;

    use super::super::test_support;
    use super::*;

    fn body(task: &str, deadline: Option<NaiveDate>) -> Json<TodoBody> {
        Json(TodoBody {
            task: task.to_string(),
            deadline,
        })
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_toggle_summary_and_filter() {
        let state = test_support::state().await;
        let past = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let (_, Json(overdue)) = create(
            State(state.clone()),
            test_support::user("alice"),
            body("renew passport", Some(past)),
        )
        .await
        .unwrap();
        let (_, Json(chore)) = create(
            State(state.clone()),
            test_support::user("alice"),
            body("water plants", None),
        )
        .await
        .unwrap();

        let Json(done) = toggle(
            State(state.clone()),
            test_support::user("alice"),
            Path(chore.id.to_string()),
        )
        .await
        .unwrap();
        assert!(done.is_completed);

        let Json(summary) = summary(
            State(state.clone()),
            test_support::user("alice"),
            Query(ViewerQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.overdue, 1);

        let Json(pending) = list(
            State(state),
            test_support::user("alice"),
            Query(TodoQuery {
                status: TodoStatus::Pending,
                sort: TodoSort::Alphabetical,
                ..TodoQuery::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, overdue.id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_other_users_todo_is_not_found() {
        let state = test_support::state().await;
        let (_, Json(todo)) = create(
            State(state.clone()),
            test_support::user("alice"),
            body("call mum", None),
        )
        .await
        .unwrap();

        let err = update(
            State(state),
            test_support::user("bob"),
            Path(todo.id.to_string()),
            body("call mum today", None),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
