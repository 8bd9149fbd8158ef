//! RocksDB-backed store.
//!
//! One row per player for profile, wallet, and statistics; ledger entries
//! and game records are append-only with inverted-timestamp index keys so a
//! forward prefix scan yields newest-first. A spin's writes go down in a
//! single `WriteBatch`, which RocksDB applies atomically.

use super::{SpinStore, StoreBatch};
use crate::engine::types::{
    GameRecord, LedgerEntry, PlayerProfile, PlayerStatistics, Wallet,
};
use crate::errors::StoreError;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

const PLAYER_PREFIX: &str = "player:";
const WALLET_PREFIX: &str = "wallet:";
const STATS_PREFIX: &str = "stats:";
const GAME_RECORD_PREFIX: &str = "game:record:";
const GAME_INDEX_PREFIX: &str = "game:index:";
const LEDGER_PREFIX: &str = "ledger:";

pub struct RocksStore {
    db: Arc<DB>,
}

impl RocksStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(64 * 1024 * 1024);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn get_json<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, StoreError> {
        match self.db.get(key)? {
            Some(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                StoreError::Corrupted(format!(
                    "failed to decode row {}: {}",
                    String::from_utf8_lossy(key),
                    e
                ))
            }),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(
        batch: &mut WriteBatch,
        key: Vec<u8>,
        value: &T,
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| StoreError::Encode(e.to_string()))?;
        batch.put(key, bytes);
        Ok(())
    }

    /// Forward scan from `prefix`, stopping at the first key outside it.
    fn scan_prefix(&self, prefix: &[u8], limit: usize) -> Vec<Vec<u8>> {
        let mut values = Vec::new();
        for item in self
            .db
            .iterator(IteratorMode::From(prefix, Direction::Forward))
        {
            let Ok((key, value)) = item else { break };
            if !key.starts_with(prefix) || values.len() >= limit {
                break;
            }
            values.push(value.to_vec());
        }
        values
    }
}

fn player_key(player_id: &str) -> Vec<u8> {
    format!("{}{}", PLAYER_PREFIX, player_id).into_bytes()
}

fn wallet_key(player_id: &str) -> Vec<u8> {
    format!("{}{}", WALLET_PREFIX, player_id).into_bytes()
}

fn stats_key(player_id: &str) -> Vec<u8> {
    format!("{}{}", STATS_PREFIX, player_id).into_bytes()
}

fn game_record_key(record_id: &str) -> Vec<u8> {
    format!("{}{}", GAME_RECORD_PREFIX, record_id).into_bytes()
}

fn game_index_prefix(player_id: &str) -> Vec<u8> {
    format!("{}{}:", GAME_INDEX_PREFIX, player_id).into_bytes()
}

fn ledger_prefix(player_id: &str) -> Vec<u8> {
    format!("{}{}:", LEDGER_PREFIX, player_id).into_bytes()
}

// Newest-first scans: inverted milliseconds as the primary sort key, the row
// id as a tiebreaker. Key layout: prefix | inv_millis(be) | id
fn timeline_key(mut prefix: Vec<u8>, timestamp_millis: i64, id: &str) -> Vec<u8> {
    let inv_millis = u64::MAX - timestamp_millis.max(0) as u64;
    prefix.extend_from_slice(&inv_millis.to_be_bytes());
    prefix.extend_from_slice(id.as_bytes());
    prefix
}

impl SpinStore for RocksStore {
    fn player(&self, player_id: &str) -> Result<Option<PlayerProfile>, StoreError> {
        self.get_json(&player_key(player_id))
    }

    fn wallet(&self, player_id: &str) -> Result<Option<Wallet>, StoreError> {
        self.get_json(&wallet_key(player_id))
    }

    fn statistics(&self, player_id: &str) -> Result<Option<PlayerStatistics>, StoreError> {
        self.get_json(&stats_key(player_id))
    }

    fn recent_games(
        &self,
        player_id: &str,
        limit: usize,
    ) -> Result<Vec<GameRecord>, StoreError> {
        let record_ids = self.scan_prefix(&game_index_prefix(player_id), limit);

        let mut games = Vec::with_capacity(record_ids.len());
        for id_bytes in record_ids {
            let record_id = String::from_utf8_lossy(&id_bytes).to_string();
            match self.get_json::<GameRecord>(&game_record_key(&record_id))? {
                Some(record) => games.push(record),
                None => {
                    return Err(StoreError::Corrupted(format!(
                        "game index points at missing record {}",
                        record_id
                    )))
                }
            }
        }
        Ok(games)
    }

    fn ledger_entries(
        &self,
        player_id: &str,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows = self.scan_prefix(&ledger_prefix(player_id), limit);
        rows.into_iter()
            .map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::Corrupted(format!("failed to decode ledger entry: {}", e))
                })
            })
            .collect()
    }

    fn commit(&self, batch: StoreBatch) -> Result<(), StoreError> {
        let mut write_batch = WriteBatch::default();

        if let Some(profile) = &batch.profile {
            Self::put_json(&mut write_batch, player_key(&profile.player_id), profile)?;
        }
        if let Some(wallet) = &batch.wallet {
            Self::put_json(&mut write_batch, wallet_key(&wallet.player_id), wallet)?;
        }
        if let Some(statistics) = &batch.statistics {
            Self::put_json(&mut write_batch, stats_key(&batch.player_id), statistics)?;
        }
        for entry in &batch.ledger {
            let key = timeline_key(
                ledger_prefix(&entry.player_id),
                entry.timestamp.timestamp_millis(),
                &entry.id,
            );
            Self::put_json(&mut write_batch, key, entry)?;
        }
        if let Some(record) = &batch.record {
            Self::put_json(&mut write_batch, game_record_key(&record.id), record)?;
            let index_key = timeline_key(
                game_index_prefix(&record.player_id),
                record.timestamp.timestamp_millis(),
                &record.id,
            );
            write_batch.put(index_key, record.id.as_bytes());
        }

        self.db.write(write_batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{LedgerDirection, LedgerReason, Wager, WagerKind};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;
    use uuid::Uuid;

    fn open_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn record_at(player_id: &str, millis: i64, outcome: u8) -> GameRecord {
        GameRecord {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            wagers: vec![Wager { kind: WagerKind::Red, stake: 10 }],
            outcome,
            total_stake: 10,
            total_payout: 0,
            profit: -10,
            timestamp: Utc.timestamp_millis_opt(millis).unwrap(),
        }
    }

    #[test]
    fn test_missing_rows_read_as_none() {
        let (store, _dir) = open_store();
        assert!(store.player("ghost").unwrap().is_none());
        assert!(store.wallet("ghost").unwrap().is_none());
        assert!(store.statistics("ghost").unwrap().is_none());
        assert!(store.recent_games("ghost", 10).unwrap().is_empty());
    }

    #[test]
    fn test_batch_writes_become_visible_together() {
        let (store, _dir) = open_store();
        let now = Utc::now();

        let batch = StoreBatch {
            player_id: "p1".to_string(),
            profile: Some(PlayerProfile {
                player_id: "p1".to_string(),
                blocked: false,
                created_at: now,
            }),
            wallet: Some(Wallet { player_id: "p1".to_string(), balance: 90 }),
            ledger: vec![LedgerEntry::new(
                "p1",
                LedgerDirection::Debit,
                10,
                LedgerReason::Stake,
                now,
            )],
            statistics: Some(PlayerStatistics {
                games_played: 1,
                total_wagered: 10,
                ..Default::default()
            }),
            record: Some(record_at("p1", now.timestamp_millis(), 0)),
        };
        store.commit(batch).unwrap();

        assert_eq!(store.wallet("p1").unwrap().unwrap().balance, 90);
        assert_eq!(store.statistics("p1").unwrap().unwrap().games_played, 1);
        assert_eq!(store.recent_games("p1", 10).unwrap().len(), 1);
        assert_eq!(store.ledger_entries("p1", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_recent_games_newest_first_and_bounded() {
        let (store, _dir) = open_store();

        for (millis, outcome) in [(1_000, 5u8), (2_000, 17), (3_000, 0)] {
            store
                .commit(StoreBatch {
                    player_id: "p1".to_string(),
                    record: Some(record_at("p1", millis, outcome)),
                    ..Default::default()
                })
                .unwrap();
        }

        let games = store.recent_games("p1", 2).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].outcome, 0);
        assert_eq!(games[1].outcome, 17);
    }

    #[test]
    fn test_players_do_not_leak_into_each_other() {
        let (store, _dir) = open_store();

        store
            .commit(StoreBatch {
                player_id: "alice".to_string(),
                record: Some(record_at("alice", 1_000, 7)),
                ..Default::default()
            })
            .unwrap();
        store
            .commit(StoreBatch {
                player_id: "bob".to_string(),
                record: Some(record_at("bob", 2_000, 12)),
                ..Default::default()
            })
            .unwrap();

        let alice = store.recent_games("alice", 10).unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].outcome, 7);
    }

    #[test]
    fn test_rows_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store
                .commit(StoreBatch {
                    player_id: "p1".to_string(),
                    wallet: Some(Wallet { player_id: "p1".to_string(), balance: 500 }),
                    ..Default::default()
                })
                .unwrap();
        }

        let store = RocksStore::open(dir.path()).unwrap();
        assert_eq!(store.wallet("p1").unwrap().unwrap().balance, 500);
    }
}
