//! Router configuration for the HTTP API.
//!
//! Sets up the read-only routes and the middleware stack (CORS, compression,
//! tracing).

use axum::{Router, routing::get};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The dashboard front-end is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Catalog
        .route("/lines", get(handlers::list_lines))
        .route("/lines/{line}/stations", get(handlers::list_stations))
        .route("/lines/{line}/directions", get(handlers::list_directions))
        .route("/slots", get(handlers::list_slots))
        // Views
        .route("/overview", get(handlers::get_overview))
        .route("/ranking", get(handlers::get_ranking))
        .route("/ranking.csv", get(handlers::get_ranking_csv))
        .route("/heatmap", get(handlers::get_heatmap))
        .route("/stations/{station}", get(handlers::get_station))
        .route("/compare", get(handlers::get_compare));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
