//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check (high priority)
        .route("/health", get(health_handler))
        // Service status
        .route("/status", get(status_handler))
        // Metrics endpoint for Prometheus
        .route("/metrics", get(metrics_handler))
        // Settlement
        .route("/api/spin", post(spin_handler))
        // Read-only projections
        .route("/api/players/:player_id/history", get(history_handler))
        .route("/api/players/:player_id/stats", get(statistics_handler))
        .route("/api/players/:player_id/balance", get(balance_handler))
        // Internal provisioning hooks for the surrounding platform
        .route("/api/players", post(register_player_handler))
        .route("/api/players/:player_id/deposit", post(deposit_handler))
        // Attach shared state
        .with_state(state)
}
