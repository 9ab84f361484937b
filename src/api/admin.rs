use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use super::auth::CurrentUser;
use super::error::{booking_error, ApiError, ErrorResponse};
use super::AppState;
use crate::services::booking::{self, BookingSummary};
use crate::services::reports::{DashboardStats, ReportSummary};
use crate::services::{pnr, reports};

#[derive(Debug, Deserialize, IntoParams)]
pub struct BookingListQuery {
    /// Substring filter over PNR and username
    pub q: Option<String>,
}

/// Dashboard statistics
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Login required", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardStats>, ApiError> {
    user.context().require_user().map_err(booking_error)?;
    let stats = reports::dashboard(&state.pool).await.map_err(booking_error)?;
    Ok(Json(stats))
}

/// Booking totals and top routes
#[utoipa::path(
    get,
    path = "/api/admin/reports",
    responses(
        (status = 200, description = "Booking report", body = ReportSummary),
        (status = 401, description = "Login required", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn report_summary(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ReportSummary>, ApiError> {
    user.context().require_user().map_err(booking_error)?;
    let report = reports::summary(&state.pool).await.map_err(booking_error)?;
    Ok(Json(report))
}

/// All bookings, optionally filtered, newest first
#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    params(BookingListQuery),
    responses(
        (status = 200, description = "Bookings, newest first", body = [BookingSummary]),
        (status = 401, description = "Login required", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingSummary>>, ApiError> {
    user.context().require_user().map_err(booking_error)?;
    let summaries = booking::list_bookings(&state.pool, query.q.as_deref())
        .await
        .map_err(booking_error)?;
    Ok(Json(summaries))
}

/// Delete a booking, restoring its seats
#[utoipa::path(
    delete,
    path = "/api/admin/bookings/{id}",
    params(("id" = i64, Path, description = "Booking id")),
    responses(
        (status = 204, description = "Booking deleted and seats restored"),
        (status = 404, description = "Unknown booking", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn delete_booking(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    booking::delete_booking(&state.pool, &user.context(), id)
        .await
        .map_err(booking_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve a booking by PNR
#[utoipa::path(
    get,
    path = "/api/admin/pnr/{pnr}",
    params(("pnr" = String, Path, description = "Booking reference, any case")),
    responses(
        (status = 200, description = "Matching booking", body = BookingSummary),
        (status = 404, description = "Unknown PNR", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn pnr_lookup(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(reference): Path<String>,
) -> Result<Json<BookingSummary>, ApiError> {
    user.context().require_user().map_err(booking_error)?;
    let found = pnr::lookup(&state.pool, &reference)
        .await
        .map_err(booking_error)?;
    let summary = booking::summarize(&state.pool, found)
        .await
        .map_err(booking_error)?;
    Ok(Json(summary))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/reports", get(report_summary))
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}", axum::routing::delete(delete_booking))
        .route("/pnr/{pnr}", get(pnr_lookup))
        .with_state(state)
}
