//! Statistics and export routes.

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use daybook_core::export::ExportOptions;
use daybook_core::stats::{Dashboard, DashboardOptions, MoodRange, MoodReport};
use serde::Deserialize;

use super::{AppState, ViewerQuery};
use crate::auth::AuthenticatedUser;
use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MoodQuery {
    #[serde(default)]
    range: MoodRange,
}

pub(super) async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(viewer): Query<ViewerQuery>,
    Query(options): Query<DashboardOptions>,
) -> Result<Json<Dashboard>, AppError> {
    let clock = viewer.clock(&state)?;
    let dashboard = state
        .journal
        .dashboard(&user.user_id, &clock, options)
        .await?;
    Ok(Json(dashboard))
}

pub(super) async fn mood(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(viewer): Query<ViewerQuery>,
    Query(query): Query<MoodQuery>,
) -> Result<Json<MoodReport>, AppError> {
    let clock = viewer.clock(&state)?;
    let report = state
        .journal
        .mood_report(&user.user_id, query.range, &clock)
        .await?;
    Ok(Json(report))
}

/// Render an export and hand it back as a download.
pub(super) async fn export(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(viewer): Query<ViewerQuery>,
    Json(options): Json<ExportOptions>,
) -> Result<Response, AppError> {
    let clock = viewer.clock(&state)?;
    let file = state
        .journal
        .export(&user.user_id, &options, &clock, user.label())
        .await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.file_name))
        .map_err(|_| AppError::Internal("export file name is not a valid header".to_string()))?;
    tracing::info!(
        endpoint = "export",
        user = state.fingerprint(&user.user_id),
        format = %options.format,
        entries = file.entry_count,
        "Served journal export"
    );

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file.mime_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use daybook_core::export::ExportFormat;
    use daybook_core::models::{EntryDraft, Mood};
    use pretty_assertions::assert_eq;

    use super::super::test_support;
    use super::*;

    async fn seeded_state() -> AppState {
        let state = test_support::state().await;
        let alice = test_support::user("alice").0.user_id;
        for (title, mood) in [("Rain", Mood::Sad), ("Sun", Mood::Happy)] {
            state
                .journal
                .create_entry(
                    &alice,
                    EntryDraft {
                        title: title.to_string(),
                        content: format!("{title} all afternoon"),
                        mood: Some(mood),
                        ..EntryDraft::default()
                    },
                )
                .await
                .unwrap();
        }
        state
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dashboard_counts_today() {
        let state = seeded_state().await;
        let Json(dashboard) = dashboard(
            State(state),
            test_support::user("alice"),
            Query(ViewerQuery::default()),
            Query(DashboardOptions::default()),
        )
        .await
        .unwrap();

        assert_eq!(dashboard.totals.total_entries, 2);
        assert_eq!(dashboard.streaks.current_streak, 1);
        assert_eq!(dashboard.calendar.len(), 30);
        assert!(dashboard.calendar.last().unwrap().is_today);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_dashboard_rejects_oversized_window() {
        let state = seeded_state().await;
        let Query(options) =
            Query::<DashboardOptions>::try_from_uri(&"/x?window_days=3000000".parse().unwrap())
                .unwrap();

        let err = dashboard(
            State(state),
            test_support::user("alice"),
            Query(ViewerQuery::default()),
            Query(options),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("window_days"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mood_report_defaults_to_week() {
        let state = seeded_state().await;
        let Json(report) = mood(
            State(state),
            test_support::user("alice"),
            Query(ViewerQuery::default()),
            Query(MoodQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(report.range, MoodRange::Week);
        assert_eq!(report.total, 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_export_sets_download_headers() {
        let state = seeded_state().await;
        let response = export(
            State(state.clone()),
            test_support::user("alice"),
            Query(ViewerQuery::default()),
            Json(ExportOptions {
                format: ExportFormat::Csv,
                ..ExportOptions::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers[header::CONTENT_TYPE],
            ExportFormat::Csv.mime_type()
        );
        let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"journal_export_"));
        assert!(disposition.ends_with(".csv\""));

        let empty = export(
            State(state),
            test_support::user("bob"),
            Query(ViewerQuery::default()),
            Json(ExportOptions::default()),
        )
        .await;
        assert_eq!(empty.unwrap_err().status(), StatusCode::NOT_FOUND);
    }
}
