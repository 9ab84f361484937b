use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::auth::CurrentUser;
use super::error::{booking_error, ApiError, ErrorResponse};
use super::AppState;
use crate::models::Station;
use crate::services::catalog;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StationListQuery {
    /// Substring filter over name and code
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStationRequest {
    pub name: String,
    /// Station code; stored uppercased
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStationRequest {
    pub name: String,
}

/// List stations, optionally filtered
#[utoipa::path(
    get,
    path = "/api/stations",
    params(StationListQuery),
    responses(
        (status = 200, description = "Stations in insertion order", body = [Station])
    ),
    tag = "stations"
)]
pub async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<StationListQuery>,
) -> Result<Json<Vec<Station>>, ApiError> {
    let stations = catalog::list_stations(&state.pool, query.q.as_deref())
        .await
        .map_err(booking_error)?;
    Ok(Json(stations))
}

/// Create a station
#[utoipa::path(
    post,
    path = "/api/stations",
    request_body = CreateStationRequest,
    responses(
        (status = 201, description = "Station created", body = Station),
        (status = 409, description = "Duplicate station code", body = ErrorResponse)
    ),
    tag = "stations"
)]
pub async fn create_station(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateStationRequest>,
) -> Result<(StatusCode, Json<Station>), ApiError> {
    user.context().require_user().map_err(booking_error)?;
    let station = catalog::create_station(&state.pool, &request.name, &request.code)
        .await
        .map_err(booking_error)?;
    Ok((StatusCode::CREATED, Json(station)))
}

/// Rename a station
#[utoipa::path(
    put,
    path = "/api/stations/{id}",
    params(("id" = i64, Path, description = "Station id")),
    request_body = UpdateStationRequest,
    responses(
        (status = 200, description = "Station updated", body = Station),
        (status = 404, description = "Unknown station", body = ErrorResponse)
    ),
    tag = "stations"
)]
pub async fn update_station(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStationRequest>,
) -> Result<Json<Station>, ApiError> {
    user.context().require_user().map_err(booking_error)?;
    let station = catalog::update_station(&state.pool, id, &request.name)
        .await
        .map_err(booking_error)?;
    Ok(Json(station))
}

/// Delete a station not referenced by any route or booking
#[utoipa::path(
    delete,
    path = "/api/stations/{id}",
    params(("id" = i64, Path, description = "Station id")),
    responses(
        (status = 204, description = "Station deleted"),
        (status = 409, description = "Station still referenced", body = ErrorResponse)
    ),
    tag = "stations"
)]
pub async fn delete_station(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    user.context().require_user().map_err(booking_error)?;
    catalog::delete_station(&state.pool, id)
        .await
        .map_err(booking_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_stations).post(create_station))
        .route("/{id}", axum::routing::put(update_station).delete(delete_station))
        .with_state(state)
}
