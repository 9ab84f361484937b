use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::auth::CurrentUser;
use super::error::{booking_error, search_error, ApiError, ErrorResponse};
use super::AppState;
use crate::models::{RouteStop, Segment, Train};
use crate::services::search::TrainListing;
use crate::services::{catalog, routes, search};

#[derive(Debug, Deserialize, IntoParams)]
pub struct TrainSearchQuery {
    /// Boarding station, case-insensitive substring
    pub from: Option<String>,
    /// Alighting station, case-insensitive substring
    pub to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrainDetail {
    pub train: Train,
    /// Route in stop order
    pub stops: Vec<RouteStop>,
    /// Derived segments in segment order
    pub segments: Vec<Segment>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTrainRequest {
    pub train_number: String,
    pub train_name: String,
    pub total_seats: i64,
    /// Fare for one segment, minor currency units
    pub fare_per_segment: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTrainRequest {
    pub train_name: Option<String>,
    pub total_seats: Option<i64>,
    pub available_seats: Option<i64>,
    pub fare_per_segment: Option<i64>,
}

/// List trains, optionally filtered by a boarding/alighting pair
#[utoipa::path(
    get,
    path = "/api/trains",
    params(TrainSearchQuery),
    responses(
        (status = 200, description = "Matching trains in catalog order", body = [TrainListing]),
        (status = 404, description = "Queried station not found", body = ErrorResponse),
        (status = 400, description = "Source and destination identical", body = ErrorResponse)
    ),
    tag = "trains"
)]
pub async fn list_trains(
    State(state): State<AppState>,
    Query(query): Query<TrainSearchQuery>,
) -> Result<Json<Vec<TrainListing>>, ApiError> {
    let listings = search::search(&state.pool, query.from.as_deref(), query.to.as_deref())
        .await
        .map_err(search_error)?;
    Ok(Json(listings))
}

/// Train detail with its route and derived segments
#[utoipa::path(
    get,
    path = "/api/trains/{id}",
    params(("id" = i64, Path, description = "Train id")),
    responses(
        (status = 200, description = "Train detail", body = TrainDetail),
        (status = 404, description = "Unknown train", body = ErrorResponse)
    ),
    tag = "trains"
)]
pub async fn get_train(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TrainDetail>, ApiError> {
    let train = catalog::train_by_id(&state.pool, id)
        .await
        .map_err(booking_error)?;
    let stops = routes::stops_for_train(&state.pool, id)
        .await
        .map_err(booking_error)?;
    let segments = routes::segments_for_train(&state.pool, id)
        .await
        .map_err(booking_error)?;
    Ok(Json(TrainDetail {
        train,
        stops,
        segments,
    }))
}

/// Add a train to the catalog
#[utoipa::path(
    post,
    path = "/api/trains",
    request_body = CreateTrainRequest,
    responses(
        (status = 201, description = "Train created with full availability", body = Train),
        (status = 409, description = "Duplicate train number", body = ErrorResponse)
    ),
    tag = "trains"
)]
pub async fn create_train(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTrainRequest>,
) -> Result<(StatusCode, Json<Train>), ApiError> {
    user.context().require_user().map_err(booking_error)?;
    let train = catalog::create_train(
        &state.pool,
        &request.train_number,
        &request.train_name,
        request.total_seats,
        request.fare_per_segment,
    )
    .await
    .map_err(booking_error)?;
    Ok((StatusCode::CREATED, Json(train)))
}

/// Update a train; seat edits must keep availability within bounds
#[utoipa::path(
    put,
    path = "/api/trains/{id}",
    params(("id" = i64, Path, description = "Train id")),
    request_body = UpdateTrainRequest,
    responses(
        (status = 200, description = "Train updated", body = Train),
        (status = 400, description = "Seat invariant violated", body = ErrorResponse),
        (status = 404, description = "Unknown train", body = ErrorResponse)
    ),
    tag = "trains"
)]
pub async fn update_train(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTrainRequest>,
) -> Result<Json<Train>, ApiError> {
    user.context().require_user().map_err(booking_error)?;
    let train = catalog::update_train(
        &state.pool,
        id,
        catalog::TrainUpdate {
            train_name: request.train_name,
            total_seats: request.total_seats,
            available_seats: request.available_seats,
            fare_per_segment: request.fare_per_segment,
        },
    )
    .await
    .map_err(booking_error)?;
    Ok(Json(train))
}

/// Delete a train with no outstanding bookings
#[utoipa::path(
    delete,
    path = "/api/trains/{id}",
    params(("id" = i64, Path, description = "Train id")),
    responses(
        (status = 204, description = "Train deleted"),
        (status = 409, description = "Bookings still reference this train", body = ErrorResponse)
    ),
    tag = "trains"
)]
pub async fn delete_train(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    user.context().require_user().map_err(booking_error)?;
    catalog::delete_train(&state.pool, id)
        .await
        .map_err(booking_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_trains).post(create_train))
        .route(
            "/{id}",
            get(get_train).put(update_train).delete(delete_train),
        )
        .with_state(state)
}
