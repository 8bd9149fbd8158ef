//! Error types for the wheelhouse settlement core.
//!
//! `SpinError` is the rejection taxonomy surfaced to callers; every variant
//! carries a stable machine-readable reason code next to its human-readable
//! message. `StoreError` covers faults in the storage backend.

use crate::engine::types::Amount;
use thiserror::Error;

/// Why a spin (or a provisioning call) was rejected.
#[derive(Debug, Error)]
pub enum SpinError {
    /// Malformed wager set: empty, unknown kind, bad straight-up number,
    /// non-positive stake, or a total above the table limit.
    #[error("invalid wager: {0}")]
    InvalidWager(String),

    /// Malformed player identifier on a provisioning call.
    #[error("invalid player id: {0}")]
    InvalidPlayerId(String),

    /// Non-positive or otherwise unusable monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The player's cooldown window has not elapsed yet.
    #[error("rate limited: spins are accepted at most once per {cooldown_ms}ms")]
    RateLimited { cooldown_ms: u64 },

    /// No such player in the identity store.
    #[error("player {0} not found")]
    PlayerNotFound(String),

    /// The account exists but is blocked from playing.
    #[error("account is blocked")]
    AccountBlocked,

    /// The wallet cannot cover the total stake.
    #[error("insufficient balance: stake {stake} exceeds balance {balance}")]
    InsufficientBalance { stake: Amount, balance: Amount },

    /// The OS entropy source failed. Never downgraded to a weaker generator;
    /// the spin aborts with nothing committed.
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    /// A balance update left the representable range.
    #[error("settlement arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl SpinError {
    /// Stable reason code for API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            SpinError::InvalidWager(_) => "INVALID_WAGER",
            SpinError::InvalidPlayerId(_) => "INVALID_PLAYER_ID",
            SpinError::InvalidAmount(_) => "INVALID_AMOUNT",
            SpinError::RateLimited { .. } => "RATE_LIMITED",
            SpinError::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            SpinError::AccountBlocked => "ACCOUNT_BLOCKED",
            SpinError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            SpinError::EntropyUnavailable(_) => "ENTROPY_UNAVAILABLE",
            SpinError::ArithmeticOverflow(_) => "ARITHMETIC_OVERFLOW",
            SpinError::Storage(_) => "STORAGE",
        }
    }

    /// Whether the error was detected before any write was staged. Everything
    /// up through `InsufficientBalance` is reported without touching the
    /// store, so no rollback is ever needed for these.
    pub fn is_pre_mutation(&self) -> bool {
        !matches!(
            self,
            SpinError::EntropyUnavailable(_)
                | SpinError::ArithmeticOverflow(_)
                | SpinError::Storage(_)
        )
    }
}

/// Storage backend faults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupted record: {0}")]
    Corrupted(String),

    #[error("failed to encode record: {0}")]
    Encode(String),
}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}
