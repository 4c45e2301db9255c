pub mod api_client;
pub mod autocomplete;
pub mod cache;
pub mod config;
pub mod db;
pub mod handlers;
pub mod openapi;
pub mod parser;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: handlers::AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/autocomplete", post(handlers::autocomplete))
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
