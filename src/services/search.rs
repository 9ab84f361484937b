//! Train search: the catalog listing, optionally filtered by a
//! boarding/alighting station pair.

use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::error::SearchError;
use crate::models::{Station, Train};

const NO_ROUTE_PLACEHOLDER: &str = "Route not configured";

/// One row of the train listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrainListing {
    pub train: Train,
    pub display_from: String,
    pub display_to: String,
    /// Departure time at the boarding stop; unset for routeless trains
    pub departure: Option<String>,
    /// Arrival time at the alighting stop; unset for routeless trains
    pub arrival: Option<String>,
    /// Full route in stop order
    pub stops: Vec<ListingStop>,
    pub no_route: bool,
}

/// A route stop joined with its station name, for display.
#[derive(Debug, Clone, Serialize, ToSchema, sqlx::FromRow)]
pub struct ListingStop {
    pub station_id: i64,
    pub station_name: String,
    pub arrival_time: String,
    pub departure_time: String,
    pub stop_order: i64,
}

/// Case-insensitive substring match, first station in insertion order.
async fn resolve_station(pool: &SqlitePool, query: &str) -> Result<Option<Station>, SearchError> {
    let station = sqlx::query_as(
        "SELECT id, name, code FROM stations
         WHERE name LIKE '%' || ? || '%'
         ORDER BY id LIMIT 1",
    )
    .bind(query.trim())
    .fetch_optional(pool)
    .await?;
    Ok(station)
}

fn nonempty(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

/// List trains in catalog insertion order.
///
/// With both queries present the listing is filtered: a train is included
/// only when both stations sit on its route in forward order, and the
/// display fields come from the matched stops. Without a filter, routeless
/// trains appear with placeholder fields; with one, they are skipped.
pub async fn search(
    pool: &SqlitePool,
    from_query: Option<&str>,
    to_query: Option<&str>,
) -> Result<Vec<TrainListing>, SearchError> {
    let filter = match (nonempty(from_query), nonempty(to_query)) {
        (Some(from_raw), Some(to_raw)) => {
            let from = resolve_station(pool, from_raw)
                .await?
                .ok_or_else(|| SearchError::StationNotFound(from_raw.to_string()))?;
            let to = resolve_station(pool, to_raw)
                .await?
                .ok_or_else(|| SearchError::StationNotFound(to_raw.to_string()))?;
            if from.id == to.id {
                return Err(SearchError::SameStation);
            }
            Some((from, to))
        }
        _ => None,
    };

    let trains: Vec<Train> = sqlx::query_as(
        "SELECT id, train_number, train_name, total_seats, available_seats, fare_per_segment
         FROM trains ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut listings = Vec::new();
    for train in trains {
        let stops: Vec<ListingStop> = sqlx::query_as(
            "SELECT rs.station_id, s.name AS station_name, rs.arrival_time,
                    rs.departure_time, rs.stop_order
             FROM route_stops rs JOIN stations s ON s.id = rs.station_id
             WHERE rs.train_id = ? ORDER BY rs.stop_order",
        )
        .bind(train.id)
        .fetch_all(pool)
        .await?;

        if stops.is_empty() {
            if filter.is_some() {
                // A specific pair can never match a routeless train.
                continue;
            }
            listings.push(TrainListing {
                train,
                display_from: NO_ROUTE_PLACEHOLDER.to_string(),
                display_to: NO_ROUTE_PLACEHOLDER.to_string(),
                departure: None,
                arrival: None,
                stops,
                no_route: true,
            });
            continue;
        }

        let (display_from, display_to, departure, arrival) = match &filter {
            Some((from, to)) => {
                let from_stop = stops.iter().find(|s| s.station_id == from.id);
                let to_stop = stops.iter().find(|s| s.station_id == to.id);
                match (from_stop, to_stop) {
                    (Some(f), Some(t)) if f.stop_order < t.stop_order => (
                        from.name.clone(),
                        to.name.clone(),
                        Some(f.departure_time.clone()),
                        Some(t.arrival_time.clone()),
                    ),
                    // Train does not serve both stations in this direction.
                    _ => continue,
                }
            }
            None => {
                let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
                    continue;
                };
                (
                    first.station_name.clone(),
                    last.station_name.clone(),
                    Some(first.departure_time.clone()),
                    Some(last.arrival_time.clone()),
                )
            }
        };

        listings.push(TrainListing {
            train,
            display_from,
            display_to,
            departure,
            arrival,
            stops,
            no_route: false,
        });
    }
    Ok(listings)
}
