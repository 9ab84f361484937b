use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use super::error::{booking_error, ApiError};
use super::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Whether the service is running
    pub healthy: bool,
    /// Number of stations in the directory
    pub station_count: i64,
    /// Number of trains in the catalog
    pub train_count: i64,
    /// Number of active bookings
    pub booking_count: i64,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let (station_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM stations")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| booking_error(e.into()))?;
    let (train_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trains")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| booking_error(e.into()))?;
    let (booking_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| booking_error(e.into()))?;

    Ok(Json(HealthResponse {
        healthy: true,
        station_count,
        train_count,
        booking_count,
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(health_check)).with_state(state)
}
