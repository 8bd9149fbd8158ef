//! Player-state storage.
//!
//! All balance-affecting writes funnel through [`SpinStore::commit`], which
//! applies an entire [`StoreBatch`] atomically: either every row of a spin
//! (wallet, ledger entries, statistics, game record) becomes visible, or
//! none does. Readers therefore only ever observe committed spins.

pub mod memory;
pub mod rocks;

pub use memory::MemoryStore;
pub use rocks::RocksStore;

use crate::engine::types::{
    GameRecord, LedgerEntry, PlayerProfile, PlayerStatistics, Wallet,
};
use crate::errors::StoreError;

/// The writes of one spin or provisioning call, applied atomically. A batch
/// always belongs to a single player, whose lock the engine holds while the
/// batch is staged and committed.
#[derive(Debug, Clone, Default)]
pub struct StoreBatch {
    pub player_id: String,
    pub profile: Option<PlayerProfile>,
    pub wallet: Option<Wallet>,
    pub ledger: Vec<LedgerEntry>,
    pub statistics: Option<PlayerStatistics>,
    pub record: Option<GameRecord>,
}

/// Store behind the settlement engine. Implementations must make `commit`
/// all-or-nothing; per-player write ordering is the engine's job (it holds
/// the player lock across load-stage-commit).
pub trait SpinStore: Send + Sync {
    fn player(&self, player_id: &str) -> Result<Option<PlayerProfile>, StoreError>;

    fn wallet(&self, player_id: &str) -> Result<Option<Wallet>, StoreError>;

    fn statistics(&self, player_id: &str) -> Result<Option<PlayerStatistics>, StoreError>;

    /// Most-recent-first game records, at most `limit` rows.
    fn recent_games(&self, player_id: &str, limit: usize)
        -> Result<Vec<GameRecord>, StoreError>;

    /// Most-recent-first ledger slice, for audit tooling and tests.
    fn ledger_entries(
        &self,
        player_id: &str,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Apply every write in the batch atomically: all visible or none.
    fn commit(&self, batch: StoreBatch) -> Result<(), StoreError>;
}
