use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A railway station.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Station {
    pub id: i64,
    pub name: String,
    /// Unique station code (e.g. "NDLS"); stored uppercased
    pub code: String,
}

/// A train and its seat inventory.
///
/// Availability is a single pool for the whole train, not per segment:
/// every booking competes for the same counter regardless of which part
/// of the route it covers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Train {
    pub id: i64,
    /// Unique operating number (e.g. "12951")
    pub train_number: String,
    pub train_name: String,
    pub total_seats: i64,
    /// Seats currently free; always within [0, total_seats]
    pub available_seats: i64,
    /// Fare for one segment, in minor currency units
    pub fare_per_segment: i64,
}

/// A scheduled stop on a train's route.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RouteStop {
    pub id: i64,
    pub train_id: i64,
    pub station_id: i64,
    /// Arrival time at this stop ("HH:MM")
    pub arrival_time: String,
    /// Departure time from this stop ("HH:MM")
    pub departure_time: String,
    /// Position on the route; unique per train, ascending along the journey
    pub stop_order: i64,
}

/// An adjacent station pair on a train's route.
///
/// Derived in full from the ordered route stops whenever the route
/// changes; never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Segment {
    pub id: i64,
    pub train_id: i64,
    pub start_station_id: i64,
    pub end_station_id: i64,
    pub segment_order: i64,
}

/// A confirmed reservation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i64,
    /// Unique booking reference ("PNR" followed by six digits)
    pub pnr: String,
    /// Owning user, referenced by value rather than foreign key
    pub username: String,
    pub train_id: i64,
    pub from_station_id: i64,
    pub to_station_id: i64,
    /// Travel date ("YYYY-MM-DD")
    pub travel_date: String,
    pub passengers: i64,
    /// Free-text passenger manifest, one passenger per line
    pub passenger_details: String,
    /// Comma separated seat numbers, when assigned
    pub seat_numbers: Option<String>,
    /// Total fare in minor currency units
    pub total_price: i64,
    pub status: String,
    /// Creation timestamp (UTC)
    pub created_at: String,
}
