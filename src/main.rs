// SafeAscent prediction core v0.1
use axum::routing::{get, post};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod aggregator;
mod cache;
mod config;
mod db;
mod domain;
mod elevation;
mod errors;
mod helpers;
mod kernels;
mod orchestrator;
mod routes;
mod similarity;
mod weather;

use cache::CacheLayer;
use config::AppConfig;
use elevation::ElevationClient;
use kernels::PredictionConfig;
use orchestrator::Orchestrator;
use routes::predict::PredictState;
use weather::WeatherClient;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 10;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 2;

/// SafeAscent Prediction Core — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SafeAscent Prediction Core",
        version = "0.1.0",
        description = "Safety-score prediction for climbing routes: a spatial-temporal \
            weighted-kernel aggregation over historical accidents, amplified by \
            current-weather similarity, bounded to a risk score in [0, 100].",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Prediction", description = "Accident-history-weighted route risk scoring"),
    ),
    paths(
        routes::health::health_check,
        routes::predict::predict,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            domain::query::RouteQueryInput,
            domain::accident::RouteType,
            domain::accident::Severity,
            domain::prediction::Prediction,
            domain::prediction::TopContributor,
            domain::prediction::PredictionMetadata,
            errors::ValidationErrorResponse,
            errors::FieldErrorBody,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safeascent_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Load the scoring tunables: kernel parameters, route-type matrix, and
    // the normalization constant.
    let prediction_config = match &config.route_type_matrix_path {
        Some(path) => PredictionConfig::load_with_matrix_path(Path::new(path)),
        None => PredictionConfig::load(),
    }
    .expect("Failed to load prediction configuration");

    // Process-local cache, shared across the weather client and (eventually)
    // whole-prediction caching.
    let cache = CacheLayer::new();

    let weather_client = WeatherClient::new(&config.weather_base_url, &config.weather_user_agent, cache)
        .expect("Failed to build weather client");
    let elevation_client = ElevationClient::new(&config.elevation_base_url);

    let orchestrator = Arc::new(Orchestrator::new(
        pool.clone(),
        weather_client,
        elevation_client,
        Arc::new(prediction_config),
    ));

    let predict_state = PredictState {
        orchestrator,
        request_timeout: config.request_timeout,
    };

    // CORS — the prediction endpoint is POST-only; GET is kept for health.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    let health_routes = Router::new().route("/api/v1/health", get(routes::health::health_check));

    let predict_routes = Router::new()
        .route("/api/v1/predict", post(routes::predict::predict))
        .with_state(predict_state);

    let app = Router::new()
        .merge(health_routes)
        .merge(predict_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
