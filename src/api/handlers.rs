//! Request Handlers
//!
//! The spin endpoint plus read-only projections (history, statistics,
//! balance) and the internal provisioning hooks used by the surrounding
//! platform.

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::engine::types::SpinRequest;
use crate::engine::SpinEngine;
use crate::metrics::MetricsRegistry;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Shared application state
pub struct AppState {
    pub engine: Arc<SpinEngine>,
    pub metrics: Arc<MetricsRegistry>,
    pub version: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: Arc<SpinEngine>, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            engine,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Instant::now(),
        }
    }
}

// Simple API key check for the internal provisioning endpoints. When no key
// is configured, requests pass (development mode).
fn validate_internal_api_key(headers: &HeaderMap, request_id: &str) -> Result<(), ApiError> {
    if let Ok(expected_key) = std::env::var("WHEELHOUSE_INTERNAL_API_KEY") {
        if let Some(provided_key) = headers.get("X-API-Key") {
            if provided_key.to_str().unwrap_or("") == expected_key {
                return Ok(());
            }
        }
        return Err(ApiError::forbidden(
            request_id.to_string(),
            "Invalid or missing internal API key".to_string(),
        ));
    }
    Ok(())
}

/// Health check handler - minimal response time
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
    })
}

/// Service status
/// GET /status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: "wheelhouse".to_string(),
        version: state.version.clone(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// Prometheus metrics
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}

/// Settle one spin: debit stake, draw, pay out, record, all atomically.
/// POST /api/spin
pub async fn spin_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpinRequest>,
) -> Result<Json<SpinResponse>, ApiError> {
    match state.engine.spin(request).await {
        Ok(result) => {
            state.metrics.record_settlement(&result);
            Ok(Json(result.into()))
        }
        Err(err) => {
            state.metrics.record_rejection();
            if !err.is_pre_mutation() {
                warn!("spin failed hard: {}", err);
            }
            Err(ApiError::from_spin(request_id.0, err))
        }
    }
}

/// Query parameters for the history endpoint
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of games to return (default: 20)
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    20
}

/// Last games for a player, most recent first
/// GET /api/players/:player_id/history?limit={n}
pub async fn history_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let games = state
        .engine
        .history(&player_id, params.limit)
        .map_err(|e| ApiError::from_spin(request_id.0, e))?;

    Ok(Json(HistoryResponse { player_id, games }))
}

/// Aggregated player statistics
/// GET /api/players/:player_id/stats
pub async fn statistics_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let statistics = state
        .engine
        .statistics(&player_id)
        .map_err(|e| ApiError::from_spin(request_id.0, e))?;

    Ok(Json(StatisticsResponse {
        player_id,
        statistics,
    }))
}

/// Wallet balance projection
/// GET /api/players/:player_id/balance
pub async fn balance_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .engine
        .balance(&player_id)
        .map_err(|e| ApiError::from_spin(request_id.0, e))?;

    Ok(Json(BalanceResponse { player_id, balance }))
}

/// Register a player (internal, idempotent)
/// POST /api/players
pub async fn register_player_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterPlayerRequest>,
) -> Result<Json<RegisterPlayerResponse>, ApiError> {
    validate_internal_api_key(&headers, &request_id.0)?;

    let profile = state
        .engine
        .register_player(&request.player_id)
        .await
        .map_err(|e| ApiError::from_spin(request_id.0, e))?;

    Ok(Json(RegisterPlayerResponse {
        player_id: profile.player_id,
        blocked: profile.blocked,
    }))
}

/// Credit funds into a wallet (internal)
/// POST /api/players/:player_id/deposit
pub async fn deposit_handler(
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<DepositResponse>, ApiError> {
    validate_internal_api_key(&headers, &request_id.0)?;

    let balance = state
        .engine
        .deposit(&player_id, request.amount)
        .await
        .map_err(|e| ApiError::from_spin(request_id.0, e))?;

    Ok(Json(DepositResponse { player_id, balance }))
}
