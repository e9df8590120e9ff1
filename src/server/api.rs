//! REST API handlers
//!
//! Every body is `{ success, data?, error? }`; errors are plain strings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::annotate::annotate_html;
use crate::cache::CacheStats;
use crate::error::{ErrorCategory, PaddockError};
use crate::utils::error::ProfileError;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Simple error response
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
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub profile_cache: CacheReport,
    pub directory_cache: CacheReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheReport {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl From<CacheStats> for CacheReport {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            entries: stats.entries,
        }
    }
}

/// Query for the profile endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    #[serde(default)]
    pub all_seasons: bool,
}

/// Annotation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateRequest {
    pub html: String,
    /// Parse as a full document instead of a fragment
    #[serde(default)]
    pub full_document: bool,
}

#[derive(Debug, Serialize)]
pub struct AnnotateResponse {
    pub html: String,
    pub wrapped: usize,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/drivers", get(list_drivers))
        .route("/api/drivers/{key}", get(get_driver))
        .route("/api/annotate", post(annotate))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.service.stats().await;

    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        profile_cache: stats.profiles.into(),
        directory_cache: stats.directory.into(),
    }))
}

/// Full roster; always succeeds
async fn list_drivers(State(state): State<AppState>) -> impl IntoResponse {
    let directory = state.service.get_directory().await;
    Json(ApiResponse::success(directory.as_ref().clone()))
}

/// One driver's profile
async fn get_driver(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> Response {
    match state
        .service
        .handle_driver_request(&key, query.all_seasons)
        .await
    {
        Ok(profile) => (StatusCode::OK, Json(ApiResponse::success(profile.as_ref()))).into_response(),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Driver request failed");
            (status_for(&e), Json(ErrorResponse::new(e.user_message()))).into_response()
        }
    }
}

/// Annotate HTML against the current directory
async fn annotate(
    State(state): State<AppState>,
    Json(request): Json<AnnotateRequest>,
) -> impl IntoResponse {
    let directory = state.service.get_directory().await;
    let annotated = annotate_html(&directory, &request.html, request.full_document);

    Json(ApiResponse::success(AnnotateResponse {
        html: annotated.html,
        wrapped: annotated.wrapped,
    }))
}

fn status_for(error: &ProfileError) -> StatusCode {
    match error.category() {
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorCategory::Config => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

// ============================================================================
// Tests
// ============================================================================
