//! API Response Models
//!
//! Request and response types for the settlement API. Wager submissions use
//! the wire shape from `engine::types` so malformed kinds and values are
//! rejected by the validator with a reason code.

use crate::engine::types::{Amount, GameRecord, PlayerStatistics, SettlementResult};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Service status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Result of a settled spin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinResponse {
    /// Winning pocket, 0..=36.
    pub outcome: u8,
    /// Total returned, stake included on wins. Minor currency units.
    pub payout: Amount,
    /// Balance after settlement.
    pub balance: Amount,
    /// Payout minus total stake; negative on a losing spin.
    pub profit: i64,
}

impl From<SettlementResult> for SpinResponse {
    fn from(result: SettlementResult) -> Self {
        Self {
            outcome: result.outcome,
            payout: result.total_payout,
            balance: result.new_balance,
            profit: result.profit,
        }
    }
}

/// Request body for player registration (internal collaborator endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPlayerRequest {
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPlayerResponse {
    pub player_id: String,
    pub blocked: bool,
}

/// Request body for deposits (internal collaborator endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRequest {
    /// Amount in minor currency units.
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositResponse {
    pub player_id: String,
    pub balance: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub player_id: String,
    pub balance: Amount,
}

/// History response, most recent game first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub player_id: String,
    pub games: Vec<GameRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub player_id: String,
    pub statistics: PlayerStatistics,
}
