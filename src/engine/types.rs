use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monetary amount in minor currency units (integer cents). All settlement
/// arithmetic is exact integer arithmetic; floats never touch balances.
pub type Amount = u64;

/// Hard ceiling on a spin's total stake: keeps `stake * 36` inside `u64`
/// and the resulting profit inside `i64`. The configurable table limit must
/// sit at or below this.
pub const MAX_SETTLEABLE_STAKE: Amount = (i64::MAX / 36) as Amount;

/// The seven recognized wager kinds, closed so validation and payout are
/// exhaustively matched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WagerKind {
    /// Straight-up bet on a single pocket, 0..=36.
    Number(u8),
    Red,
    Black,
    Odd,
    Even,
    Low,
    High,
}

/// A single validated wager. Immutable once accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wager {
    pub kind: WagerKind,
    pub stake: Amount,
}

/// Wire shape of one wager as submitted by the caller. Kind and value stay
/// untyped here so malformed input is rejected by the validator with a
/// reason code instead of failing JSON deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WagerRequest {
    pub kind: String,
    /// Pocket number, required iff kind is "number".
    #[serde(default)]
    pub value: Option<i64>,
    /// Stake in minor units. Signed on the wire so non-positive stakes reach
    /// the validator.
    pub amount: i64,
}

/// A spin submission: one player, a non-empty set of wagers. Consumed once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinRequest {
    pub player_id: String,
    pub wagers: Vec<WagerRequest>,
}

/// Outcome of a settled spin. Derived once, never mutated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SettlementResult {
    /// Winning pocket, 0..=36.
    pub outcome: u8,
    pub total_stake: Amount,
    /// Total returned to the player, stake included on wins.
    pub total_payout: Amount,
    /// `total_payout - total_stake`; negative on a losing spin.
    pub profit: i64,
    pub new_balance: Amount,
}

/// Direction of a ledger entry relative to the player's wallet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LedgerDirection {
    Debit,
    Credit,
}

/// Why a ledger entry exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LedgerReason {
    Stake,
    Payout,
    Deposit,
}

/// One append-only, balance-affecting transaction. Every wallet delta has
/// exactly one of these; balances are never set to absolute values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub player_id: String,
    pub direction: LedgerDirection,
    pub amount: Amount,
    pub reason: LedgerReason,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        player_id: &str,
        direction: LedgerDirection,
        amount: Amount,
        reason: LedgerReason,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.to_string(),
            direction,
            amount,
            reason,
            timestamp,
        }
    }
}

/// Player identity row owned by the surrounding platform; the core only
/// checks existence and active status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: String,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
}

/// Wallet row, one per player. Balance is non-negative by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub player_id: String,
    pub balance: Amount,
}

impl Wallet {
    /// Fresh zero-balance wallet, created lazily on first use.
    pub fn empty(player_id: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            balance: 0,
        }
    }
}

/// Monotonic per-player aggregates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub games_played: u64,
    pub games_won: u64,
    pub total_wagered: Amount,
    pub total_won: Amount,
    pub biggest_win: Amount,
}

impl PlayerStatistics {
    /// Fold one settled spin into the aggregates. Played/wagered always move;
    /// the win-side counters only move when the payout is positive.
    pub fn record_spin(&mut self, total_stake: Amount, total_payout: Amount) {
        self.games_played += 1;
        self.total_wagered = self.total_wagered.saturating_add(total_stake);
        if total_payout > 0 {
            self.games_won += 1;
            self.total_won = self.total_won.saturating_add(total_payout);
            self.biggest_win = self.biggest_win.max(total_payout);
        }
    }
}

/// Immutable audit row written once per completed spin; feeds the history
/// endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub player_id: String,
    pub wagers: Vec<Wager>,
    pub outcome: u8,
    pub total_stake: Amount,
    pub total_payout: Amount,
    pub profit: i64,
    pub timestamp: DateTime<Utc>,
}
