//! Booking engine: validation, creation, cancellation, and retrieval.
//!
//! A booking and its train's seat counter are always updated inside one
//! transaction. The decrement is conditional on enough seats remaining, so
//! two racing requests can never oversell: the loser's update touches zero
//! rows and the whole booking rolls back.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

use super::error::BookingError;
use super::{catalog, fare, pnr, routes, RequestContext};
use crate::models::Booking;

pub(crate) const BOOKING_COLUMNS: &str = "id, pnr, username, train_id, from_station_id, \
     to_station_id, travel_date, passengers, passenger_details, seat_numbers, total_price, \
     status, created_at";

/// A booking request as it arrives from the caller.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub train_id: i64,
    pub from_station_id: i64,
    pub to_station_id: i64,
    pub travel_date: NaiveDate,
    pub passengers: i64,
    pub passenger_details: String,
}

/// A booking joined with display data: names and the matched stops' times.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingSummary {
    pub booking: Booking,
    pub train_name: String,
    pub train_number: String,
    pub from_station: String,
    pub to_station: String,
    /// Departure from the boarding stop, if it is still on the route
    pub departure_time: Option<String>,
    /// Arrival at the alighting stop, if it is still on the route
    pub arrival_time: Option<String>,
}

/// Validate and persist a booking, decrementing the train's seat pool.
///
/// Validation is fail-fast in contract order: station pair on the route,
/// stop order, travel date, seat availability. The first failing check
/// decides the reported reason.
pub async fn create_booking(
    pool: &SqlitePool,
    ctx: &RequestContext,
    request: &BookingRequest,
) -> Result<Booking, BookingError> {
    let username = ctx.require_user()?;

    let train = catalog::train_by_id(pool, request.train_id).await?;
    let stops = routes::stops_for_train(pool, train.id).await?;

    let from_stop = stops.iter().find(|s| s.station_id == request.from_station_id);
    let to_stop = stops.iter().find(|s| s.station_id == request.to_station_id);
    let (from_stop, to_stop) = match (from_stop, to_stop) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(BookingError::InvalidSelection),
    };
    if from_stop.stop_order >= to_stop.stop_order {
        return Err(BookingError::InvalidSelection);
    }

    if request.travel_date < Local::now().date_naive() {
        return Err(BookingError::PastDate);
    }

    if request.passengers > train.available_seats {
        return Err(BookingError::InsufficientSeats);
    }

    let total_price = fare::compute_fare(
        train.fare_per_segment,
        from_stop.stop_order,
        to_stop.stop_order,
        request.passengers,
    )?;

    let mut tx = pool.begin().await?;
    let reference = pnr::allocate(&mut tx).await?;

    let booking: Booking = sqlx::query_as(&format!(
        "INSERT INTO bookings
             (pnr, username, train_id, from_station_id, to_station_id,
              travel_date, passengers, passenger_details, total_price, status)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'CONFIRMED')
         RETURNING {BOOKING_COLUMNS}"
    ))
    .bind(&reference)
    .bind(username)
    .bind(train.id)
    .bind(request.from_station_id)
    .bind(request.to_station_id)
    .bind(request.travel_date.to_string())
    .bind(request.passengers)
    .bind(&request.passenger_details)
    .bind(total_price)
    .fetch_one(&mut *tx)
    .await?;

    // Conditional decrement: a concurrent booking that got there first
    // makes this touch zero rows, and the insert above rolls back with it.
    let updated = sqlx::query(
        "UPDATE trains SET available_seats = available_seats - ?1
         WHERE id = ?2 AND available_seats >= ?1",
    )
    .bind(request.passengers)
    .bind(train.id)
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(BookingError::InsufficientSeats);
    }

    tx.commit().await?;

    info!(
        pnr = %booking.pnr,
        train_id = train.id,
        passengers = request.passengers,
        total_price,
        "Created booking"
    );
    Ok(booking)
}

/// Cancel a booking, restoring its seats to the train.
///
/// Bookings whose travel date has already passed stay on record.
pub async fn cancel_booking(
    pool: &SqlitePool,
    ctx: &RequestContext,
    booking_id: i64,
) -> Result<(), BookingError> {
    ctx.require_user()?;
    let booking = booking_by_id(pool, booking_id).await?;

    let travel = NaiveDate::parse_from_str(&booking.travel_date, "%Y-%m-%d")
        .map_err(|e| BookingError::Storage(format!("stored travel_date unreadable: {e}")))?;
    if travel < Local::now().date_naive() {
        return Err(BookingError::PastDate);
    }

    release_seats_and_delete(pool, &booking).await?;
    info!(pnr = %booking.pnr, train_id = booking.train_id, "Cancelled booking");
    Ok(())
}

/// Administrative deletion. Same seat restoration as cancellation, without
/// the travel-date cutoff.
pub async fn delete_booking(
    pool: &SqlitePool,
    ctx: &RequestContext,
    booking_id: i64,
) -> Result<(), BookingError> {
    ctx.require_user()?;
    let booking = booking_by_id(pool, booking_id).await?;
    release_seats_and_delete(pool, &booking).await?;
    info!(pnr = %booking.pnr, train_id = booking.train_id, "Deleted booking");
    Ok(())
}

/// Restore a booking's seats and remove the record, atomically.
///
/// Single code path shared by user cancellation and administrative
/// deletion. The restore is clamped at total_seats.
async fn release_seats_and_delete(
    pool: &SqlitePool,
    booking: &Booking,
) -> Result<(), BookingError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE trains SET available_seats = MIN(total_seats, available_seats + ?)
         WHERE id = ?",
    )
    .bind(booking.passengers)
    .bind(booking.train_id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM bookings WHERE id = ?")
        .bind(booking.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn booking_by_id(pool: &SqlitePool, booking_id: i64) -> Result<Booking, BookingError> {
    let booking: Option<Booking> = sqlx::query_as(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"
    ))
    .bind(booking_id)
    .fetch_optional(pool)
    .await?;
    booking.ok_or(BookingError::NotFound("Booking"))
}

/// Bookings owned by the calling user, newest first.
pub async fn bookings_for_user(
    pool: &SqlitePool,
    ctx: &RequestContext,
) -> Result<Vec<BookingSummary>, BookingError> {
    let username = ctx.require_user()?;
    let bookings: Vec<Booking> = sqlx::query_as(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE username = ? ORDER BY id DESC"
    ))
    .bind(username)
    .fetch_all(pool)
    .await?;

    let mut summaries = Vec::with_capacity(bookings.len());
    for booking in bookings {
        summaries.push(summarize(pool, booking).await?);
    }
    Ok(summaries)
}

/// All bookings, optionally filtered by PNR/username substring, newest
/// first. Administrative listing.
pub async fn list_bookings(
    pool: &SqlitePool,
    query: Option<&str>,
) -> Result<Vec<BookingSummary>, BookingError> {
    let bookings: Vec<Booking> = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            sqlx::query_as(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE pnr LIKE '%' || ?1 || '%' OR username LIKE '%' || ?1 || '%'
                 ORDER BY id DESC"
            ))
            .bind(q)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY id DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };

    let mut summaries = Vec::with_capacity(bookings.len());
    for booking in bookings {
        summaries.push(summarize(pool, booking).await?);
    }
    Ok(summaries)
}

pub async fn booking_summary(
    pool: &SqlitePool,
    booking_id: i64,
) -> Result<BookingSummary, BookingError> {
    let booking = booking_by_id(pool, booking_id).await?;
    summarize(pool, booking).await
}

/// Join a booking with train/station names and the matched stops' times.
///
/// Times come from the route as it is now; a stop edited away since the
/// booking leaves them unset.
pub async fn summarize(pool: &SqlitePool, booking: Booking) -> Result<BookingSummary, BookingError> {
    let train = catalog::train_by_id(pool, booking.train_id).await?;
    let from_station = catalog::station_by_id(pool, booking.from_station_id).await?;
    let to_station = catalog::station_by_id(pool, booking.to_station_id).await?;

    let stops = routes::stops_for_train(pool, booking.train_id).await?;
    let departure_time = stops
        .iter()
        .find(|s| s.station_id == booking.from_station_id)
        .map(|s| s.departure_time.clone());
    let arrival_time = stops
        .iter()
        .find(|s| s.station_id == booking.to_station_id)
        .map(|s| s.arrival_time.clone());

    Ok(BookingSummary {
        booking,
        train_name: train.train_name,
        train_number: train.train_number,
        from_station: from_station.name,
        to_station: to_station.name,
        departure_time,
        arrival_time,
    })
}
