//! In-memory store.
//!
//! Backs unit tests and local experiments. A single mutex guards the whole
//! state, so a committed batch becomes visible in one step, matching the
//! atomicity contract of the RocksDB store.

use super::{SpinStore, StoreBatch};
use crate::engine::types::{
    GameRecord, LedgerEntry, PlayerProfile, PlayerStatistics, Wallet,
};
use crate::errors::StoreError;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    players: HashMap<String, PlayerProfile>,
    wallets: HashMap<String, Wallet>,
    statistics: HashMap<String, PlayerStatistics>,
    // Oldest-first per player; read back in reverse.
    ledger: HashMap<String, Vec<LedgerEntry>>,
    games: HashMap<String, Vec<GameRecord>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpinStore for MemoryStore {
    fn player(&self, player_id: &str) -> Result<Option<PlayerProfile>, StoreError> {
        Ok(self.inner.lock().unwrap().players.get(player_id).cloned())
    }

    fn wallet(&self, player_id: &str) -> Result<Option<Wallet>, StoreError> {
        Ok(self.inner.lock().unwrap().wallets.get(player_id).cloned())
    }

    fn statistics(&self, player_id: &str) -> Result<Option<PlayerStatistics>, StoreError> {
        Ok(self.inner.lock().unwrap().statistics.get(player_id).cloned())
    }

    fn recent_games(
        &self,
        player_id: &str,
        limit: usize,
    ) -> Result<Vec<GameRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .games
            .get(player_id)
            .map(|games| games.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn ledger_entries(
        &self,
        player_id: &str,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .ledger
            .get(player_id)
            .map(|entries| entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn commit(&self, batch: StoreBatch) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(profile) = batch.profile {
            inner.players.insert(profile.player_id.clone(), profile);
        }
        if let Some(wallet) = batch.wallet {
            inner.wallets.insert(wallet.player_id.clone(), wallet);
        }
        if let Some(statistics) = batch.statistics {
            inner.statistics.insert(batch.player_id.clone(), statistics);
        }
        for entry in batch.ledger {
            inner
                .ledger
                .entry(entry.player_id.clone())
                .or_default()
                .push(entry);
        }
        if let Some(record) = batch.record {
            inner
                .games
                .entry(record.player_id.clone())
                .or_default()
                .push(record);
        }
        Ok(())
    }
}
