//! REST API handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::server::AppState;
use crate::dispatch::DispatchError;
use crate::models::PlayoutJob;

// ============================================================================
// API Response Types
// ============================================================================

/// Error body for every non-2xx answer
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        // State endpoints
        .route("/api/all", get(all_jobs))
        .route("/api/upcoming", get(upcoming_jobs))
        .route("/api/scheduled", get(scheduled_jobs))
        // Manual dispatch
        .route("/api/schedulePlayout", post(schedule_playout))
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// State Handlers
// ============================================================================

async fn all_jobs(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.jobs().await)
}

async fn upcoming_jobs(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.upcoming().await)
}

async fn scheduled_jobs(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.scheduled().await)
}

// ============================================================================
// Dispatch Handlers
// ============================================================================

/// Dispatch the posted job immediately, without padding.
///
/// Answers with the scheduled set as it stands after the acknowledgement.
async fn schedule_playout(
    State(state): State<AppState>,
    body: Result<Json<PlayoutJob>, JsonRejection>,
) -> Response {
    let job = match body {
        Ok(Json(job)) => job,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected manual dispatch body");
            return error(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    if let Err(reason) = job.validate() {
        tracing::debug!(%reason, "Rejected manual dispatch job");
        return error(StatusCode::BAD_REQUEST, reason);
    }

    tracing::info!(job_id = job.id, room = %job.room, "Manual dispatch requested");

    match state.dispatcher.schedule_manual(&job).await {
        Ok(done) => (StatusCode::OK, Json(done.scheduled)).into_response(),
        Err(e @ DispatchError::Routing { .. }) => {
            error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Err(e) => error(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}
