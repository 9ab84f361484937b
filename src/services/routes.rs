//! Route model: ordered stops per train and the segments derived from them.
//!
//! Segments are a materialized view of the stop ordering. Every route edit
//! deletes and recreates the full segment set for the train inside one
//! transaction, so readers never observe a half-rebuilt route.

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use super::error::BookingError;
use crate::models::{RouteStop, Segment};

/// Adjacent station pairs for an ordered stop sequence.
///
/// Pure derivation; the caller persists the result. Routes with fewer than
/// two stops have no segments.
pub fn derive_segments(stops: &[RouteStop]) -> Vec<(i64, i64)> {
    stops
        .windows(2)
        .map(|pair| (pair[0].station_id, pair[1].station_id))
        .collect()
}

/// Stops for a train in route order.
pub async fn stops_for_train(
    pool: &SqlitePool,
    train_id: i64,
) -> Result<Vec<RouteStop>, BookingError> {
    let stops = sqlx::query_as(
        "SELECT id, train_id, station_id, arrival_time, departure_time, stop_order
         FROM route_stops WHERE train_id = ? ORDER BY stop_order",
    )
    .bind(train_id)
    .fetch_all(pool)
    .await?;
    Ok(stops)
}

/// Current segment set for a train in segment order.
pub async fn segments_for_train(
    pool: &SqlitePool,
    train_id: i64,
) -> Result<Vec<Segment>, BookingError> {
    let segments = sqlx::query_as(
        "SELECT id, train_id, start_station_id, end_station_id, segment_order
         FROM segments WHERE train_id = ? ORDER BY segment_order",
    )
    .bind(train_id)
    .fetch_all(pool)
    .await?;
    Ok(segments)
}

/// Append a stop to the end of a train's route and rebuild its segments.
///
/// The new stop's order is one past the current maximum (1 for an empty
/// route). A station may appear at most once per route.
pub async fn add_stop(
    pool: &SqlitePool,
    train_id: i64,
    station_id: i64,
    arrival_time: &str,
    departure_time: &str,
) -> Result<RouteStop, BookingError> {
    let mut tx = pool.begin().await?;

    let train: Option<(i64,)> = sqlx::query_as("SELECT id FROM trains WHERE id = ?")
        .bind(train_id)
        .fetch_optional(&mut *tx)
        .await?;
    if train.is_none() {
        return Err(BookingError::NotFound("Train"));
    }
    let station: Option<(i64,)> = sqlx::query_as("SELECT id FROM stations WHERE id = ?")
        .bind(station_id)
        .fetch_optional(&mut *tx)
        .await?;
    if station.is_none() {
        return Err(BookingError::NotFound("Station"));
    }

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM route_stops WHERE train_id = ? AND station_id = ?")
            .bind(train_id)
            .bind(station_id)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_some() {
        return Err(BookingError::DuplicateKey(
            "station is already on this train's route".to_string(),
        ));
    }

    let (next_order,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(MAX(stop_order), 0) + 1 FROM route_stops WHERE train_id = ?",
    )
    .bind(train_id)
    .fetch_one(&mut *tx)
    .await?;

    let stop: RouteStop = sqlx::query_as(
        "INSERT INTO route_stops (train_id, station_id, arrival_time, departure_time, stop_order)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id, train_id, station_id, arrival_time, departure_time, stop_order",
    )
    .bind(train_id)
    .bind(station_id)
    .bind(arrival_time)
    .bind(departure_time)
    .bind(next_order)
    .fetch_one(&mut *tx)
    .await?;

    regenerate_segments(&mut tx, train_id).await?;
    tx.commit().await?;

    info!(train_id, station_id, stop_order = stop.stop_order, "Added route stop");
    Ok(stop)
}

/// Remove a stop and rebuild the owning train's segments.
///
/// Removing an interior stop merges its neighbours into adjacent pairs;
/// no bridging segment is synthesized.
pub async fn remove_stop(pool: &SqlitePool, route_stop_id: i64) -> Result<(), BookingError> {
    let mut tx = pool.begin().await?;

    let row: Option<(i64,)> = sqlx::query_as("SELECT train_id FROM route_stops WHERE id = ?")
        .bind(route_stop_id)
        .fetch_optional(&mut *tx)
        .await?;
    let (train_id,) = row.ok_or(BookingError::NotFound("Route stop"))?;

    sqlx::query("DELETE FROM route_stops WHERE id = ?")
        .bind(route_stop_id)
        .execute(&mut *tx)
        .await?;

    regenerate_segments(&mut tx, train_id).await?;
    tx.commit().await?;

    info!(train_id, route_stop_id, "Removed route stop");
    Ok(())
}

/// Delete and recreate every segment for a train from its current stops.
///
/// Not incremental: a single stop change recomputes the full set, which is
/// fine at route sizes of a handful of stops.
pub async fn regenerate_segments(
    tx: &mut Transaction<'_, Sqlite>,
    train_id: i64,
) -> Result<(), BookingError> {
    sqlx::query("DELETE FROM segments WHERE train_id = ?")
        .bind(train_id)
        .execute(&mut **tx)
        .await?;

    let stops: Vec<RouteStop> = sqlx::query_as(
        "SELECT id, train_id, station_id, arrival_time, departure_time, stop_order
         FROM route_stops WHERE train_id = ? ORDER BY stop_order",
    )
    .bind(train_id)
    .fetch_all(&mut **tx)
    .await?;

    for (index, (start, end)) in derive_segments(&stops).into_iter().enumerate() {
        sqlx::query(
            "INSERT INTO segments (train_id, start_station_id, end_station_id, segment_order)
             VALUES (?, ?, ?, ?)",
        )
        .bind(train_id)
        .bind(start)
        .bind(end)
        .bind(index as i64 + 1)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog;
    use crate::services::testutil::test_pool;

    fn stop(station_id: i64, stop_order: i64) -> RouteStop {
        RouteStop {
            id: stop_order,
            train_id: 1,
            station_id,
            arrival_time: "08:00".to_string(),
            departure_time: "08:10".to_string(),
            stop_order,
        }
    }

    #[test]
    fn no_segments_below_two_stops() {
        assert!(derive_segments(&[]).is_empty());
        assert!(derive_segments(&[stop(10, 1)]).is_empty());
    }

    #[test]
    fn segments_mirror_adjacent_pairs() {
        let stops = [stop(10, 1), stop(20, 2), stop(30, 3)];
        assert_eq!(derive_segments(&stops), vec![(10, 20), (20, 30)]);
    }

    async fn seeded_route(pool: &sqlx::SqlitePool, codes: &[&str]) -> (i64, Vec<i64>) {
        let train = catalog::create_train(pool, "12951", "Rajdhani Express", 100, 50)
            .await
            .unwrap();
        let mut station_ids = Vec::new();
        for code in codes {
            let station = catalog::create_station(pool, code, code).await.unwrap();
            add_stop(pool, train.id, station.id, "08:00", "08:10")
                .await
                .unwrap();
            station_ids.push(station.id);
        }
        (train.id, station_ids)
    }

    #[tokio::test]
    async fn stop_orders_are_sequential_from_one() {
        let pool = test_pool().await;
        let (train_id, _) = seeded_route(&pool, &["AAA", "BBB", "CCC"]).await;

        let stops = stops_for_train(&pool, train_id).await.unwrap();
        let orders: Vec<i64> = stops.iter().map(|s| s.stop_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn segments_track_route_edits() {
        let pool = test_pool().await;
        let (train_id, stations) = seeded_route(&pool, &["AAA", "BBB", "CCC"]).await;

        let segments = segments_for_train(&pool, train_id).await.unwrap();
        let pairs: Vec<(i64, i64)> = segments
            .iter()
            .map(|s| (s.start_station_id, s.end_station_id))
            .collect();
        assert_eq!(pairs, vec![(stations[0], stations[1]), (stations[1], stations[2])]);
        assert_eq!(segments[0].segment_order, 1);
        assert_eq!(segments[1].segment_order, 2);
    }

    #[tokio::test]
    async fn removing_interior_stop_merges_neighbours() {
        let pool = test_pool().await;
        let (train_id, stations) = seeded_route(&pool, &["AAA", "BBB", "CCC", "DDD"]).await;

        let stops = stops_for_train(&pool, train_id).await.unwrap();
        let b = stops.iter().find(|s| s.station_id == stations[1]).unwrap();
        remove_stop(&pool, b.id).await.unwrap();

        let segments = segments_for_train(&pool, train_id).await.unwrap();
        let pairs: Vec<(i64, i64)> = segments
            .iter()
            .map(|s| (s.start_station_id, s.end_station_id))
            .collect();
        // B's segments are discarded, not bridged: A->C then C->D.
        assert_eq!(pairs, vec![(stations[0], stations[2]), (stations[2], stations[3])]);
    }

    #[tokio::test]
    async fn regeneration_is_idempotent_for_fixed_ordering() {
        let pool = test_pool().await;
        let (train_id, _) = seeded_route(&pool, &["AAA", "BBB", "CCC"]).await;

        let before = segments_for_train(&pool, train_id).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        regenerate_segments(&mut tx, train_id).await.unwrap();
        tx.commit().await.unwrap();

        let after = segments_for_train(&pool, train_id).await.unwrap();
        let strip = |segments: &[Segment]| -> Vec<(i64, i64, i64)> {
            segments
                .iter()
                .map(|s| (s.start_station_id, s.end_station_id, s.segment_order))
                .collect()
        };
        assert_eq!(strip(&before), strip(&after));
    }

    #[tokio::test]
    async fn duplicate_station_on_route_is_rejected() {
        let pool = test_pool().await;
        let (train_id, stations) = seeded_route(&pool, &["AAA", "BBB"]).await;

        let err = add_stop(&pool, train_id, stations[0], "10:00", "10:05")
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn unknown_train_or_station_is_not_found() {
        let pool = test_pool().await;
        let station = catalog::create_station(&pool, "Alpha", "AAA").await.unwrap();
        let train = catalog::create_train(&pool, "100", "Shuttle", 10, 5).await.unwrap();

        let err = add_stop(&pool, 9999, station.id, "08:00", "08:10")
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound("Train")));

        let err = add_stop(&pool, train.id, 9999, "08:00", "08:10")
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound("Station")));

        let err = remove_stop(&pool, 9999).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound("Route stop")));
    }
}
