//! HTTP surface: router, shared extractors and the auth middleware.

mod entries;
mod insights;
mod notes;
mod tags;
mod todos;

use std::hash::{DefaultHasher, Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use daybook_core::{JournalService, LocalClock};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{extract_bearer_token, SupabaseJwtVerifier};
use crate::config::AppConfig;
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    journal: JournalService,
    jwt_verifier: Arc<SupabaseJwtVerifier>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, journal: JournalService) -> Self {
        Self {
            jwt_verifier: Arc::new(SupabaseJwtVerifier::new(config.clone())),
            journal,
            config,
        }
    }

    /// Hashed user id for log lines
    fn fingerprint(&self, user: &daybook_core::UserId) -> String {
        user_fingerprint(&self.config.log_fingerprint_salt, user.as_str())
    }
}

pub fn app_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/entries", get(entries::list).post(entries::create))
        .route("/entries/search", post(entries::search))
        .route(
            "/entries/{id}",
            get(entries::show).put(entries::update).delete(entries::remove),
        )
        .route("/entries/{id}/favorite", post(entries::toggle_favorite))
        .route("/tags", get(tags::list).post(tags::create))
        .route("/tags/suggest", get(tags::suggest))
        .route("/tags/{id}", axum::routing::delete(tags::remove))
        .route("/notes", get(notes::list).post(notes::create))
        .route("/notes/{id}", axum::routing::put(notes::update).delete(notes::remove))
        .route("/notes/{id}/favorite", post(notes::toggle_favorite))
        .route("/todos", get(todos::list).post(todos::create))
        .route("/todos/summary", get(todos::summary))
        .route("/todos/{id}", axum::routing::put(todos::update).delete(todos::remove))
        .route("/todos/{id}/toggle", post(todos::toggle))
        .route("/stats/dashboard", get(insights::dashboard))
        .route("/stats/mood", get(insights::mood))
        .route("/export", post(insights::export))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let origins = if state.config.cors_allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(state.config.cors_allowed_origins.clone())
    };

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/v1", protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().timestamp(),
    })
}

async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;
    let user = state.jwt_verifier.verify_access_token(token).await?;
    tracing::debug!(
        user = state.fingerprint(&user.user_id),
        session = user.session_id.as_deref().unwrap_or("none"),
        "Authenticated request"
    );
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// The viewer's zone, as minutes east of UTC.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ViewerQuery {
    tz_offset_minutes: Option<i32>,
}

impl ViewerQuery {
    /// A clock for "now" in the viewer's zone, falling back to the configured default.
    fn clock(&self, state: &AppState) -> Result<LocalClock, AppError> {
        let minutes = self
            .tz_offset_minutes
            .unwrap_or(state.config.default_tz_offset_minutes);
        LocalClock::with_offset_minutes(Utc::now(), minutes)
            .map_err(|error| AppError::bad_request(error.to_string()))
    }
}

fn parse_path_id<T: FromStr>(raw: &str, kind: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::bad_request(format!("'{raw}' is not a valid {kind} id")))
}

fn user_fingerprint(salt: &str, user_id: &str) -> String {
    let mut hasher = DefaultHasher::new();
    salt.hash(&mut hasher);
    user_id.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Extension;
    use daybook_core::UserId;

    use super::AppState;
    use crate::auth::AuthenticatedUser;
    use crate::config::test_config;

    pub async fn state() -> AppState {
        let journal = daybook_core::JournalService::open_in_memory().await.unwrap();
        AppState::new(std::sync::Arc::new(test_config()), journal)
    }

    pub fn user(name: &str) -> Extension<AuthenticatedUser> {
        Extension(AuthenticatedUser {
            user_id: UserId::new(name).unwrap(),
            email: None,
            session_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Query;
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_viewer_clock_uses_query_then_default() {
        let state = test_support::state().await;

        let Query(query): Query<ViewerQuery> =
            Query::try_from_uri(&"/x?tz_offset_minutes=330".parse().unwrap()).unwrap();
        let clock = query.clock(&state).unwrap();
        assert_eq!(clock.offset().local_minus_utc(), 330 * 60);

        let fallback = ViewerQuery::default().clock(&state).unwrap();
        assert_eq!(fallback.offset().local_minus_utc(), 0);

        let bad = ViewerQuery {
            tz_offset_minutes: Some(900),
        };
        assert!(matches!(bad.clock(&state), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_fingerprint_is_stable_and_salted() {
        let a = user_fingerprint("salt", "user-1");
        assert_eq!(a, user_fingerprint("salt", "user-1"));
        assert_eq!(a.len(), 16);
        assert!(!a.contains("user-1"));
        assert_ne!(a, user_fingerprint("pepper", "user-1"));
    }

    #[test]
    fn test_parse_path_id_rejects_garbage() {
        let err = parse_path_id::<daybook_core::EntryId>("nope", "entry").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_requires_bearer_token() {
        let router = app_router(test_support::state().await);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = reqwest::Client::new();
        let health = client
            .get(format!("http://{addr}/healthz"))
            .send()
            .await
            .unwrap();
        assert_eq!(health.status().as_u16(), 200);
        let body: serde_json::Value = health.json().await.unwrap();
        assert_eq!(body["status"], "ok");

        let denied = client
            .get(format!("http://{addr}/v1/entries"))
            .send()
            .await
            .unwrap();
        assert_eq!(denied.status().as_u16(), 401);
        let body: serde_json::Value = denied.json().await.unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Missing Authorization header"));

        let basic = client
            .get(format!("http://{addr}/v1/stats/dashboard"))
            .header("authorization", "Basic abc")
            .send()
            .await
            .unwrap();
        assert_eq!(basic.status().as_u16(), 401);
    }
}
