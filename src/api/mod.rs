pub mod admin;
pub mod auth;
pub mod bookings;
pub mod error;
pub mod health;
pub mod route_stops;
pub mod stations;
pub mod trains;
pub mod users;

pub use error::ErrorResponse;

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;

use crate::services::notify::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub notifier: Arc<Notifier>,
}

pub fn router(pool: SqlitePool, notifier: Arc<Notifier>) -> Router {
    let state = AppState { pool, notifier };

    Router::new()
        .nest("/stations", stations::router(state.clone()))
        .nest("/trains", trains::router(state.clone()))
        .nest("/route-stops", route_stops::router(state.clone()))
        .nest("/bookings", bookings::router(state.clone()))
        .nest("/users", users::router(state.clone()))
        .nest("/admin", admin::router(state.clone()))
        .nest("/health", health::router(state))
}
