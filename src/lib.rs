//! Contact Discovery Server
//!
//! Stores one-way hashes of contact identifiers (e.g. hashed phone numbers)
//! and lets clients discover which are registered by submitting hash
//! prefixes. Matches come back truncated.
//!
//! Lookups are open. Inserting and deleting hashes requires HTTP Basic
//! credentials carrying the configured API password.

pub mod auth;
pub mod config;
pub mod error;
pub mod registry;
pub mod state;

use axum::{
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use state::AppState;

/// Build the HTTP router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/contacts/", post(registry::api::lookup))
        .route(
            "/hashes/:hash/",
            post(registry::api::add_hash).delete(registry::api::delete_hash),
        )
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "contact-discovery",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Statistics endpoint.
async fn stats_handler(State(state): State<AppState>) -> Response {
    match state.registry.count() {
        Ok(count) => Json(json!({
            "hash_count": count,
            "min_prefix_length": state.registry.min_prefix_len(),
            "max_hash_length": state.registry.max_hash_len(),
            "timestamp": chrono::Utc::now().timestamp_millis(),
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}
