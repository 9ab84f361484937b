use thiserror::Error;

/// Errors produced by the booking core.
///
/// Every variant is recoverable at the request boundary; persistence
/// failures travel separately as `Storage` so callers can tell a rejected
/// request from a broken backend.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Bad, reversed, or missing station pair for the train's route.
    #[error("Invalid station selection")]
    InvalidSelection,
    #[error("You cannot select a past date")]
    PastDate,
    #[error("Not enough seats available")]
    InsufficientSeats,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    /// The bounded generate-check-retry loop ran out of attempts.
    #[error("Could not allocate a unique PNR after {0} attempts")]
    PnrExhausted(u32),
    #[error("Login required")]
    Unauthorized,
    /// Deletion refused while other records still reference the row.
    #[error("{0} is referenced by existing records")]
    InUse(&'static str),
    /// Administrative input that violates a catalog invariant.
    #[error("{0}")]
    Invalid(&'static str),
    #[error("Database error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for BookingError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                BookingError::DuplicateKey(db.message().to_string())
            }
            _ => BookingError::Storage(e.to_string()),
        }
    }
}

/// Errors produced by the train search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Station '{0}' not found")]
    StationNotFound(String),
    #[error("Source and destination cannot be the same")]
    SameStation,
    #[error("Database error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for SearchError {
    fn from(e: sqlx::Error) -> Self {
        SearchError::Storage(e.to_string())
    }
}
