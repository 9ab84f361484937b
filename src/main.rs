pub mod api;
mod config;
mod models;
mod services;

use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use services::notify::Notifier;

#[derive(OpenApi)]
#[openapi(
    info(title = "RailConnect API", version = "0.1.0"),
    paths(
        api::health::health_check,
        api::stations::list_stations,
        api::stations::create_station,
        api::stations::update_station,
        api::stations::delete_station,
        api::trains::list_trains,
        api::trains::get_train,
        api::trains::create_train,
        api::trains::update_train,
        api::trains::delete_train,
        api::route_stops::add_route_stop,
        api::route_stops::remove_route_stop,
        api::bookings::create_booking,
        api::bookings::my_bookings,
        api::bookings::get_booking,
        api::bookings::cancel_booking,
        api::users::list_users,
        api::users::create_user,
        api::users::update_user,
        api::users::delete_user,
        api::admin::dashboard,
        api::admin::report_summary,
        api::admin::list_bookings,
        api::admin::delete_booking,
        api::admin::pnr_lookup,
    ),
    components(schemas(
        api::ErrorResponse,
        api::health::HealthResponse,
        api::stations::CreateStationRequest,
        api::stations::UpdateStationRequest,
        api::trains::TrainDetail,
        api::trains::CreateTrainRequest,
        api::trains::UpdateTrainRequest,
        api::route_stops::AddRouteStopRequest,
        api::bookings::CreateBookingRequest,
        api::users::UserView,
        api::users::CreateUserRequest,
        api::users::UpdateUserRequest,
        models::Station,
        models::Train,
        models::RouteStop,
        models::Segment,
        models::Booking,
        services::booking::BookingSummary,
        services::search::TrainListing,
        services::search::ListingStop,
        services::reports::DashboardStats,
        services::reports::ReportSummary,
        services::reports::TopRoute,
    )),
    tags(
        (name = "trains", description = "Train catalog and search"),
        (name = "stations", description = "Station directory"),
        (name = "routes", description = "Route stops and derived segments"),
        (name = "bookings", description = "Seat reservations and cancellations"),
        (name = "users", description = "User management"),
        (name = "admin", description = "Dashboard, reports and PNR lookup"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info,sqlx=warn".into()),
        )
        .init();

    // Load config
    let config = Config::load("config.yaml").expect("Failed to load config");

    // Build CORS layer based on config
    let cors_layer = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode explicitly enabled (all origins allowed) - DO NOT USE IN PRODUCTION");
        CorsLayer::permissive()
    } else if !config.cors_origins.is_empty() {
        tracing::info!(origins = ?config.cors_origins, "CORS: Restricting to configured origins");
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        panic!("CORS configuration error: Either set 'cors_origins' with allowed origins, or set 'cors_permissive: true' for development");
    };

    // Initialize SQLite database
    let pool = SqlitePool::connect(&config.database_url)
        .await
        .expect("Failed to connect to SQLite database");

    // Run migrations
    let migrator = sqlx::migrate!("./migrations");
    tracing::info!(migrations = migrator.migrations.len(), "Found migrations");
    migrator.run(&pool).await.expect("Failed to run migrations");
    tracing::info!("Database migrations completed");

    let notifier = Arc::new(Notifier::from_webhook_url(
        config.notification.webhook_url.clone(),
    ));
    if matches!(*notifier, Notifier::Log) {
        tracing::info!("No notification webhook configured; ticket confirmations will be logged");
    }

    // Build the app
    let app = Router::new()
        .route("/", get(root))
        .nest("/api", api::router(pool.clone(), notifier))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!(addr = %config.bind_addr, "RailConnect running");
    tracing::info!("Swagger UI: /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

async fn root() -> &'static str {
    "RailConnect API"
}
