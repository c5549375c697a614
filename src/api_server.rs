// Axum API Server Module
//
// Purpose: JSON API over the level checker. The reference table is loaded once
// and shared read-only by all request handlers.

#[cfg(feature = "api")]
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

#[cfg(feature = "api")]
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use crate::checker::{LevelCheckRequest, LevelChecker};

#[cfg(feature = "api")]
use crate::data::LevelTable;

#[cfg(feature = "api")]
use crate::error::CheckError;

// ============================================================================
// Application State
// ============================================================================

#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<LevelChecker>,
}

#[cfg(feature = "api")]
impl AppState {
    /// Load the reference table from `records_path`
    pub fn new(records_path: &str) -> anyhow::Result<Self> {
        tracing::info!("Loading reference records from {}...", records_path);
        let table = LevelTable::load(records_path)?;
        Ok(Self::from_table(table))
    }

    pub fn from_table(table: LevelTable) -> Self {
        Self {
            checker: Arc::new(LevelChecker::new(table)),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Form options
        .route("/api/options", get(get_options))
        .route("/api/events/:event/distances", get(get_distances))

        // Level check
        .route("/api/level/check", post(check_level))

        // Middleware (applied in reverse order)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "records": state.checker.table().len(),
    }))
}

/// Selector contents: genders, events and age brackets
#[cfg(feature = "api")]
async fn get_options(State(state): State<AppState>) -> Json<serde_json::Value> {
    let table = state.checker.table();
    let age_brackets: Vec<&str> = table
        .age_brackets()
        .iter()
        .map(|b| b.label.as_str())
        .collect();

    Json(serde_json::json!({
        "genders": table.genders(),
        "events": table.events(),
        "age_brackets": age_brackets,
    }))
}

#[cfg(feature = "api")]
async fn get_distances(
    State(state): State<AppState>,
    Path(event): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let table = state.checker.table();
    if !table.has_event(&event) {
        return Err(AppError::NotFound(format!("Event {} not found", event)));
    }

    Ok(Json(serde_json::json!({
        "event": event,
        "distances": table.available_distances(&event),
    })))
}

#[cfg(feature = "api")]
async fn check_level(
    State(state): State<AppState>,
    payload: Result<Json<LevelCheckRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(request) = payload?;
    tracing::debug!("Level check request: {:?}", request);

    let report = state.checker.check(&request)?;
    let messages = report.messages();

    Ok(Json(serde_json::json!({
        "age_bracket": report.age_bracket,
        "time_seconds": report.time_seconds,
        "level": report.level,
        "next_level": report.next_level,
        "messages": messages,
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug)]
enum AppError {
    Check(CheckError),
    InvalidRequest(JsonRejection),
    NotFound(String),
}

#[cfg(feature = "api")]
impl From<CheckError> for AppError {
    fn from(err: CheckError) -> Self {
        AppError::Check(err)
    }
}

#[cfg(feature = "api")]
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection)
    }
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            AppError::Check(err) => {
                let status = match err {
                    CheckError::InvalidTimeFormat(_) => StatusCode::BAD_REQUEST,
                    CheckError::InvalidAgeBracket { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    CheckError::NoMatchingLevel { .. } => StatusCode::NOT_FOUND,
                };
                tracing::debug!("Level check rejected: {}", err);
                (
                    status,
                    serde_json::json!({
                        "error": err.kind(),
                        "message": err.user_message(),
                        "detail": err.to_string(),
                    }),
                )
            }
            // Malformed bodies, wrong field types and negative time fields
            AppError::InvalidRequest(rejection) => {
                tracing::debug!("Level check body rejected: {}", rejection.body_text());
                (
                    StatusCode::BAD_REQUEST,
                    serde_json::json!({
                        "error": "invalid_request",
                        "message": CheckError::InvalidTimeFormat(String::new()).user_message(),
                        "detail": rejection.body_text(),
                    }),
                )
            }
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({
                    "error": "not_found",
                    "message": msg,
                    "detail": msg,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
