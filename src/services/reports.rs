//! Administrative aggregates: dashboard statistics and booking reports.

use chrono::{Duration, Local};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use super::error::BookingError;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_trains: i64,
    /// Bookings travelling today
    pub today_bookings: i64,
    /// Sum of all booking prices, minor currency units
    pub total_revenue: i64,
    /// Booking counts per travel date over the last 7 days, oldest first
    pub weekly_bookings: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct TopRoute {
    pub train_name: String,
    pub from_station: String,
    pub to_station: String,
    pub bookings: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportSummary {
    pub total_bookings: i64,
    pub total_revenue: i64,
    /// Most-booked (train, from, to) triples, busiest first
    pub top_routes: Vec<TopRoute>,
}

pub async fn dashboard(pool: &SqlitePool) -> Result<DashboardStats, BookingError> {
    let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    let (total_trains,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trains")
        .fetch_one(pool)
        .await?;
    let (total_revenue,): (i64,) =
        sqlx::query_as("SELECT COALESCE(SUM(total_price), 0) FROM bookings")
            .fetch_one(pool)
            .await?;

    let today = Local::now().date_naive();
    let (today_bookings,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE travel_date = ?")
            .bind(today.to_string())
            .fetch_one(pool)
            .await?;

    let mut weekly_bookings = Vec::with_capacity(7);
    for days_back in (0..7).rev() {
        let day = today - Duration::days(days_back);
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE travel_date = ?")
                .bind(day.to_string())
                .fetch_one(pool)
                .await?;
        weekly_bookings.push(count);
    }

    Ok(DashboardStats {
        total_users,
        total_trains,
        today_bookings,
        total_revenue,
        weekly_bookings,
    })
}

pub async fn summary(pool: &SqlitePool) -> Result<ReportSummary, BookingError> {
    let (total_bookings,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
        .fetch_one(pool)
        .await?;
    let (total_revenue,): (i64,) =
        sqlx::query_as("SELECT COALESCE(SUM(total_price), 0) FROM bookings")
            .fetch_one(pool)
            .await?;

    let top_routes: Vec<TopRoute> = sqlx::query_as(
        "SELECT t.train_name, sf.name AS from_station, st.name AS to_station,
                COUNT(*) AS bookings
         FROM bookings b
         JOIN trains t ON t.id = b.train_id
         JOIN stations sf ON sf.id = b.from_station_id
         JOIN stations st ON st.id = b.to_station_id
         GROUP BY b.train_id, b.from_station_id, b.to_station_id
         ORDER BY bookings DESC, t.train_name
         LIMIT 5",
    )
    .fetch_all(pool)
    .await?;

    Ok(ReportSummary {
        total_bookings,
        total_revenue,
        top_routes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::booking::{self, BookingRequest};
    use crate::services::testutil::{ctx, test_pool};
    use crate::services::{catalog, routes};
    use chrono::NaiveDate;

    async fn seeded(pool: &SqlitePool) -> (i64, Vec<i64>) {
        sqlx::query("INSERT INTO users (username, email, password) VALUES ('asha', 'asha@example.com', 'pw')")
            .execute(pool)
            .await
            .unwrap();

        let train = catalog::create_train(pool, "12951", "Express", 100, 50).await.unwrap();
        let mut stations = Vec::new();
        for (name, code) in [("Alpha", "AAA"), ("Beta", "BBB"), ("Gamma", "CCC")] {
            let station = catalog::create_station(pool, name, code).await.unwrap();
            routes::add_stop(pool, train.id, station.id, "08:00", "08:10").await.unwrap();
            stations.push(station.id);
        }
        (train.id, stations)
    }

    fn request(train_id: i64, from: i64, to: i64, travel_date: NaiveDate) -> BookingRequest {
        BookingRequest {
            train_id,
            from_station_id: from,
            to_station_id: to,
            travel_date,
            passengers: 1,
            passenger_details: String::new(),
        }
    }

    #[tokio::test]
    async fn dashboard_counts_today_and_revenue() {
        let pool = test_pool().await;
        let (train_id, stations) = seeded(&pool).await;

        let today = Local::now().date_naive();
        booking::create_booking(&pool, &ctx("asha"), &request(train_id, stations[0], stations[2], today))
            .await
            .unwrap();
        booking::create_booking(
            &pool,
            &ctx("asha"),
            &request(train_id, stations[0], stations[1], today + Duration::days(10)),
        )
        .await
        .unwrap();

        let stats = dashboard(&pool).await.unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_trains, 1);
        assert_eq!(stats.today_bookings, 1);
        // 2 segments * 50 + 1 segment * 50
        assert_eq!(stats.total_revenue, 150);
        assert_eq!(stats.weekly_bookings.len(), 7);
        assert_eq!(stats.weekly_bookings[6], 1);
    }

    #[tokio::test]
    async fn top_routes_are_ordered_by_booking_count() {
        let pool = test_pool().await;
        let (train_id, stations) = seeded(&pool).await;

        let date = Local::now().date_naive() + Duration::days(5);
        for _ in 0..3 {
            booking::create_booking(&pool, &ctx("asha"), &request(train_id, stations[0], stations[2], date))
                .await
                .unwrap();
        }
        booking::create_booking(&pool, &ctx("asha"), &request(train_id, stations[1], stations[2], date))
            .await
            .unwrap();

        let report = summary(&pool).await.unwrap();
        assert_eq!(report.total_bookings, 4);
        assert_eq!(report.top_routes.len(), 2);
        assert_eq!(report.top_routes[0].from_station, "Alpha");
        assert_eq!(report.top_routes[0].bookings, 3);
        assert_eq!(report.top_routes[1].bookings, 1);
    }
}
