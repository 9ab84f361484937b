//! Station directory and train catalog management.

use sqlx::SqlitePool;
use tracing::info;

use super::error::BookingError;
use crate::models::{Station, Train};

pub async fn list_stations(
    pool: &SqlitePool,
    query: Option<&str>,
) -> Result<Vec<Station>, BookingError> {
    let stations = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            sqlx::query_as(
                "SELECT id, name, code FROM stations
                 WHERE name LIKE '%' || ?1 || '%' OR code LIKE '%' || ?1 || '%'
                 ORDER BY id",
            )
            .bind(q)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as("SELECT id, name, code FROM stations ORDER BY id")
                .fetch_all(pool)
                .await?
        }
    };
    Ok(stations)
}

pub async fn station_by_id(pool: &SqlitePool, id: i64) -> Result<Station, BookingError> {
    let station: Option<Station> =
        sqlx::query_as("SELECT id, name, code FROM stations WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    station.ok_or(BookingError::NotFound("Station"))
}

pub async fn create_station(
    pool: &SqlitePool,
    name: &str,
    code: &str,
) -> Result<Station, BookingError> {
    let name = name.trim();
    let code = code.trim().to_uppercase();
    if name.is_empty() || code.is_empty() {
        return Err(BookingError::Invalid("Station name and code are required"));
    }

    let station: Station = sqlx::query_as(
        "INSERT INTO stations (name, code) VALUES (?, ?) RETURNING id, name, code",
    )
    .bind(name)
    .bind(&code)
    .fetch_one(pool)
    .await?;

    info!(station_id = station.id, code = %station.code, "Created station");
    Ok(station)
}

/// Rename a station. The code is fixed once assigned.
pub async fn update_station(
    pool: &SqlitePool,
    id: i64,
    name: &str,
) -> Result<Station, BookingError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BookingError::Invalid("Station name is required"));
    }

    let station: Option<Station> = sqlx::query_as(
        "UPDATE stations SET name = ? WHERE id = ? RETURNING id, name, code",
    )
    .bind(name)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    station.ok_or(BookingError::NotFound("Station"))
}

/// Delete a station, refusing while any route or booking references it.
pub async fn delete_station(pool: &SqlitePool, id: i64) -> Result<(), BookingError> {
    station_by_id(pool, id).await?;

    let (route_refs,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM route_stops WHERE station_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    let (booking_refs,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM bookings WHERE from_station_id = ?1 OR to_station_id = ?1",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if route_refs > 0 || booking_refs > 0 {
        return Err(BookingError::InUse("Station"));
    }

    sqlx::query("DELETE FROM stations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    info!(station_id = id, "Deleted station");
    Ok(())
}

pub async fn train_by_id(pool: &SqlitePool, id: i64) -> Result<Train, BookingError> {
    let train: Option<Train> = sqlx::query_as(
        "SELECT id, train_number, train_name, total_seats, available_seats, fare_per_segment
         FROM trains WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    train.ok_or(BookingError::NotFound("Train"))
}

/// Create a train. `available_seats` starts equal to `total_seats`; this is
/// the only point where availability is initialized.
pub async fn create_train(
    pool: &SqlitePool,
    train_number: &str,
    train_name: &str,
    total_seats: i64,
    fare_per_segment: i64,
) -> Result<Train, BookingError> {
    let train_number = train_number.trim();
    let train_name = train_name.trim();
    if train_number.is_empty() || train_name.is_empty() {
        return Err(BookingError::Invalid("Train number and name are required"));
    }
    if total_seats < 0 {
        return Err(BookingError::Invalid("total_seats must not be negative"));
    }
    if fare_per_segment < 0 {
        return Err(BookingError::Invalid("fare_per_segment must not be negative"));
    }

    let train: Train = sqlx::query_as(
        "INSERT INTO trains (train_number, train_name, total_seats, available_seats, fare_per_segment)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id, train_number, train_name, total_seats, available_seats, fare_per_segment",
    )
    .bind(train_number)
    .bind(train_name)
    .bind(total_seats)
    .bind(total_seats)
    .bind(fare_per_segment)
    .fetch_one(pool)
    .await?;

    info!(train_id = train.id, number = %train.train_number, total_seats, "Created train");
    Ok(train)
}

/// Partial train update from the administrative surface.
#[derive(Debug, Default, Clone)]
pub struct TrainUpdate {
    pub train_name: Option<String>,
    pub total_seats: Option<i64>,
    pub available_seats: Option<i64>,
    pub fare_per_segment: Option<i64>,
}

/// Apply a partial update, rejecting any edit that would break
/// `0 <= available_seats <= total_seats`.
pub async fn update_train(
    pool: &SqlitePool,
    id: i64,
    update: TrainUpdate,
) -> Result<Train, BookingError> {
    let current = train_by_id(pool, id).await?;

    let train_name = update.train_name.unwrap_or(current.train_name);
    let total_seats = update.total_seats.unwrap_or(current.total_seats);
    let available_seats = update.available_seats.unwrap_or(current.available_seats);
    let fare_per_segment = update.fare_per_segment.unwrap_or(current.fare_per_segment);

    if available_seats < 0 || available_seats > total_seats {
        return Err(BookingError::Invalid(
            "available_seats must stay within [0, total_seats]",
        ));
    }
    if fare_per_segment < 0 {
        return Err(BookingError::Invalid("fare_per_segment must not be negative"));
    }

    let train: Train = sqlx::query_as(
        "UPDATE trains
         SET train_name = ?, total_seats = ?, available_seats = ?, fare_per_segment = ?
         WHERE id = ?
         RETURNING id, train_number, train_name, total_seats, available_seats, fare_per_segment",
    )
    .bind(&train_name)
    .bind(total_seats)
    .bind(available_seats)
    .bind(fare_per_segment)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(train)
}

/// Delete a train along with its owned route stops and segments, refusing
/// while bookings still reference it.
pub async fn delete_train(pool: &SqlitePool, id: i64) -> Result<(), BookingError> {
    train_by_id(pool, id).await?;

    let (booking_refs,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE train_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if booking_refs > 0 {
        return Err(BookingError::InUse("Train"));
    }

    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM segments WHERE train_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM route_stops WHERE train_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM trains WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(train_id = id, "Deleted train");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::test_pool;
    use crate::services::routes;

    #[tokio::test]
    async fn train_starts_with_full_availability() {
        let pool = test_pool().await;
        let train = create_train(&pool, "12951", "Rajdhani Express", 100, 50)
            .await
            .unwrap();
        assert_eq!(train.available_seats, 100);
        assert_eq!(train.total_seats, 100);
    }

    #[tokio::test]
    async fn duplicate_train_number_is_rejected() {
        let pool = test_pool().await;
        create_train(&pool, "12951", "Rajdhani Express", 100, 50)
            .await
            .unwrap();
        let err = create_train(&pool, "12951", "Duplicate", 50, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn station_code_is_uppercased_and_unique() {
        let pool = test_pool().await;
        let station = create_station(&pool, "Howrah Junction", "hwh").await.unwrap();
        assert_eq!(station.code, "HWH");

        let err = create_station(&pool, "Howrah Again", "HWH").await.unwrap_err();
        assert!(matches!(err, BookingError::DuplicateKey(_)));
    }

    #[tokio::test]
    async fn update_rejects_seat_invariant_violation() {
        let pool = test_pool().await;
        let train = create_train(&pool, "12951", "Rajdhani Express", 100, 50)
            .await
            .unwrap();

        let err = update_train(
            &pool,
            train.id,
            TrainUpdate {
                available_seats: Some(150),
                ..TrainUpdate::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BookingError::Invalid(_)));

        let err = update_train(
            &pool,
            train.id,
            TrainUpdate {
                available_seats: Some(-1),
                ..TrainUpdate::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BookingError::Invalid(_)));
    }

    #[tokio::test]
    async fn referenced_station_cannot_be_deleted() {
        let pool = test_pool().await;
        let station = create_station(&pool, "Howrah Junction", "HWH").await.unwrap();
        let train = create_train(&pool, "12951", "Rajdhani Express", 100, 50)
            .await
            .unwrap();
        routes::add_stop(&pool, train.id, station.id, "08:00", "08:10")
            .await
            .unwrap();

        let err = delete_station(&pool, station.id).await.unwrap_err();
        assert!(matches!(err, BookingError::InUse("Station")));
    }

    #[tokio::test]
    async fn unreferenced_station_deletes_cleanly() {
        let pool = test_pool().await;
        let station = create_station(&pool, "Howrah Junction", "HWH").await.unwrap();
        delete_station(&pool, station.id).await.unwrap();
        let err = station_by_id(&pool, station.id).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound("Station")));
    }

    #[tokio::test]
    async fn deleting_train_removes_owned_route_data() {
        let pool = test_pool().await;
        let a = create_station(&pool, "Alpha", "AAA").await.unwrap();
        let b = create_station(&pool, "Beta", "BBB").await.unwrap();
        let train = create_train(&pool, "100", "Shuttle", 10, 5).await.unwrap();
        routes::add_stop(&pool, train.id, a.id, "08:00", "08:05").await.unwrap();
        routes::add_stop(&pool, train.id, b.id, "09:00", "09:05").await.unwrap();

        delete_train(&pool, train.id).await.unwrap();

        let (stops,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM route_stops WHERE train_id = ?")
                .bind(train.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        let (segments,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM segments WHERE train_id = ?")
                .bind(train.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(stops, 0);
        assert_eq!(segments, 0);
    }
}
