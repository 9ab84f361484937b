use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use super::auth::CurrentUser;
use super::error::{booking_error, ApiError, ErrorResponse};
use super::AppState;
use crate::models::RouteStop;
use crate::services::routes;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddRouteStopRequest {
    pub train_id: i64,
    pub station_id: i64,
    /// Arrival time at the stop ("HH:MM")
    pub arrival_time: String,
    /// Departure time from the stop ("HH:MM")
    pub departure_time: String,
}

/// Append a stop to a train's route, rebuilding its segments
#[utoipa::path(
    post,
    path = "/api/route-stops",
    request_body = AddRouteStopRequest,
    responses(
        (status = 201, description = "Stop appended to the route", body = RouteStop),
        (status = 404, description = "Unknown train or station", body = ErrorResponse),
        (status = 409, description = "Station already on the route", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn add_route_stop(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<AddRouteStopRequest>,
) -> Result<(StatusCode, Json<RouteStop>), ApiError> {
    user.context().require_user().map_err(booking_error)?;
    let stop = routes::add_stop(
        &state.pool,
        request.train_id,
        request.station_id,
        &request.arrival_time,
        &request.departure_time,
    )
    .await
    .map_err(booking_error)?;
    Ok((StatusCode::CREATED, Json(stop)))
}

/// Remove a stop from its route, rebuilding the train's segments
#[utoipa::path(
    delete,
    path = "/api/route-stops/{id}",
    params(("id" = i64, Path, description = "Route stop id")),
    responses(
        (status = 204, description = "Stop removed"),
        (status = 404, description = "Unknown route stop", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn remove_route_stop(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    user.context().require_user().map_err(booking_error)?;
    routes::remove_stop(&state.pool, id)
        .await
        .map_err(booking_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(add_route_stop))
        .route("/{id}", delete(remove_route_stop))
        .with_state(state)
}
