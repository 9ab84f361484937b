use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;
use utoipa::ToSchema;

use super::auth::CurrentUser;
use super::error::{bad_request, booking_error, ApiError, ErrorResponse};
use super::AppState;
use crate::services::booking::{self, BookingRequest, BookingSummary};
use crate::services::notify::TicketConfirmation;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub train_id: i64,
    pub from_station_id: i64,
    pub to_station_id: i64,
    /// Travel date ("YYYY-MM-DD")
    pub travel_date: String,
    pub passengers: i64,
    /// Free-text passenger manifest, one passenger per line
    #[serde(default)]
    pub passenger_details: String,
}

/// Book seats on a train
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking confirmed", body = BookingSummary),
        (status = 400, description = "Invalid selection or past date", body = ErrorResponse),
        (status = 401, description = "Login required", body = ErrorResponse),
        (status = 409, description = "Not enough seats", body = ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingSummary>), ApiError> {
    let travel_date = NaiveDate::parse_from_str(&request.travel_date, "%Y-%m-%d")
        .map_err(|_| bad_request("travel_date must be YYYY-MM-DD"))?;

    let booking = booking::create_booking(
        &state.pool,
        &user.context(),
        &BookingRequest {
            train_id: request.train_id,
            from_station_id: request.from_station_id,
            to_station_id: request.to_station_id,
            travel_date,
            passengers: request.passengers,
            passenger_details: request.passenger_details,
        },
    )
    .await
    .map_err(booking_error)?;

    let summary = booking::summarize(&state.pool, booking)
        .await
        .map_err(booking_error)?;

    send_confirmation(&state, &summary).await;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Hand the confirmation to the notifier without blocking the response.
/// Delivery failures are the notifier's problem, never the booking's.
async fn send_confirmation(state: &AppState, summary: &BookingSummary) {
    let email: Option<(String,)> =
        sqlx::query_as("SELECT email FROM users WHERE username = ?")
            .bind(&summary.booking.username)
            .fetch_optional(&state.pool)
            .await
            .unwrap_or(None);

    let Some((recipient_email,)) = email else {
        warn!(
            username = %summary.booking.username,
            pnr = %summary.booking.pnr,
            "No user record for booking; skipping confirmation"
        );
        return;
    };

    let ticket = TicketConfirmation {
        pnr: summary.booking.pnr.clone(),
        train_name: summary.train_name.clone(),
        train_number: summary.train_number.clone(),
        from_station: summary.from_station.clone(),
        to_station: summary.to_station.clone(),
        travel_date: summary.booking.travel_date.clone(),
        departure_time: summary.departure_time.clone(),
        arrival_time: summary.arrival_time.clone(),
        passenger_details: summary.booking.passenger_details.clone(),
        total_price: summary.booking.total_price,
        recipient_email,
    };
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        notifier.send(&ticket).await;
    });
}

/// Bookings of the calling user, newest first
#[utoipa::path(
    get,
    path = "/api/bookings",
    responses(
        (status = 200, description = "Bookings owned by the caller", body = [BookingSummary]),
        (status = 401, description = "Login required", body = ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<BookingSummary>>, ApiError> {
    let summaries = booking::bookings_for_user(&state.pool, &user.context())
        .await
        .map_err(booking_error)?;
    Ok(Json(summaries))
}

/// Booking summary with resolved names and times
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = i64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking summary", body = BookingSummary),
        (status = 404, description = "Unknown booking", body = ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BookingSummary>, ApiError> {
    let summary = booking::booking_summary(&state.pool, id)
        .await
        .map_err(booking_error)?;
    Ok(Json(summary))
}

/// Cancel a booking, restoring its seats
#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    params(("id" = i64, Path, description = "Booking id")),
    responses(
        (status = 204, description = "Booking cancelled and seats restored"),
        (status = 400, description = "Travel date already passed", body = ErrorResponse),
        (status = 404, description = "Unknown booking", body = ErrorResponse)
    ),
    tag = "bookings"
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    booking::cancel_booking(&state.pool, &user.context(), id)
        .await
        .map_err(booking_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(my_bookings).post(create_booking))
        .route("/{id}", get(get_booking).delete(cancel_booking))
        .with_state(state)
}
