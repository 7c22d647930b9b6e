//! HTTP handlers for the REST API.
//!
//! Each handler extracts the caller and the request, delegates to the
//! service layer, and returns JSON. Dates default to today in the local
//! timezone.

use axum::{extract::State, Json};

use super::dto::HealthResponse;
use super::error::AppError;
use super::state::AppState;

pub mod account;
pub mod admin;
pub mod calendar;
pub mod change_requests;
pub mod leave;
pub mod notifications;
pub mod organization;
pub mod presence;
pub mod time_entries;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repo().health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}
