//! Wheelhouse - Roulette Wager-Settlement Core
//!
//! Accepts a player's set of bets, atomically debits the stake, draws an
//! outcome from OS entropy, computes the payout, credits winnings, and
//! records the immutable ledger and game rows - all as a single
//! all-or-nothing commit per spin, safe under concurrent access.

pub mod api;
pub mod config;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod store;

pub use config::{GameConfig, WheelhouseConfig};
pub use engine::{
    Amount, OsEntropySource, OutcomeSource, SettlementResult, SpinEngine, SpinRequest,
};
pub use errors::{SpinError, StoreError};
pub use store::{MemoryStore, RocksStore, SpinStore};
