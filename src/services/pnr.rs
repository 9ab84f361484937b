//! PNR directory: allocation and lookup of booking references.

use rand::Rng;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::booking::BOOKING_COLUMNS;
use super::error::BookingError;
use crate::models::Booking;

/// Maximum generate-check attempts before giving up.
const MAX_ATTEMPTS: u32 = 8;

/// Canonical form used for storage and lookup.
pub fn normalize(input: &str) -> String {
    input.trim().to_uppercase()
}

fn random_reference() -> String {
    format!("PNR{}", rand::thread_rng().gen_range(100_000..=999_999))
}

/// Allocate a booking reference not yet present in the bookings table.
///
/// Runs inside the booking transaction. The unique constraint on
/// `bookings.pnr` remains the backstop for a race between check and
/// insert; this loop just makes collisions an explicit, bounded retry
/// instead of a storage-layer surprise.
pub async fn allocate(tx: &mut Transaction<'_, Sqlite>) -> Result<String, BookingError> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_reference();
        let taken: Option<(i64,)> = sqlx::query_as("SELECT id FROM bookings WHERE pnr = ?")
            .bind(&candidate)
            .fetch_optional(&mut **tx)
            .await?;
        if taken.is_none() {
            return Ok(candidate);
        }
    }
    Err(BookingError::PnrExhausted(MAX_ATTEMPTS))
}

/// Resolve a booking by its reference; input is trimmed and uppercased.
pub async fn lookup(pool: &SqlitePool, pnr: &str) -> Result<Booking, BookingError> {
    let normalized = normalize(pnr);
    let booking: Option<Booking> = sqlx::query_as(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE pnr = ?"
    ))
    .bind(&normalized)
    .fetch_optional(pool)
    .await?;
    booking.ok_or(BookingError::NotFound("PNR"))
}
