use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::{BookingError, SearchError};

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// Map a core error to its HTTP representation.
pub fn booking_error(err: BookingError) -> ApiError {
    let status = match &err {
        BookingError::InvalidSelection | BookingError::PastDate | BookingError::Invalid(_) => {
            StatusCode::BAD_REQUEST
        }
        BookingError::InsufficientSeats
        | BookingError::DuplicateKey(_)
        | BookingError::InUse(_) => StatusCode::CONFLICT,
        BookingError::NotFound(_) => StatusCode::NOT_FOUND,
        BookingError::Unauthorized => StatusCode::UNAUTHORIZED,
        BookingError::PnrExhausted(_) | BookingError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, err.to_string())
}

pub fn search_error(err: SearchError) -> ApiError {
    let status = match &err {
        SearchError::StationNotFound(_) => StatusCode::NOT_FOUND,
        SearchError::SameStation => StatusCode::BAD_REQUEST,
        SearchError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_errors_map_to_expected_statuses() {
        assert_eq!(booking_error(BookingError::InvalidSelection).0, StatusCode::BAD_REQUEST);
        assert_eq!(booking_error(BookingError::PastDate).0, StatusCode::BAD_REQUEST);
        assert_eq!(booking_error(BookingError::InsufficientSeats).0, StatusCode::CONFLICT);
        assert_eq!(booking_error(BookingError::NotFound("Train")).0, StatusCode::NOT_FOUND);
        assert_eq!(booking_error(BookingError::Unauthorized).0, StatusCode::UNAUTHORIZED);
        assert_eq!(
            booking_error(BookingError::Storage("boom".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn search_errors_map_to_expected_statuses() {
        assert_eq!(
            search_error(SearchError::StationNotFound("X".into())).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(search_error(SearchError::SameStation).0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_body_carries_the_reason() {
        let (_, Json(body)) = booking_error(BookingError::InsufficientSeats);
        assert_eq!(body.error, "Not enough seats available");
    }
}
