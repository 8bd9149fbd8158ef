//! Per-player spin cooldown gate.
//!
//! Tracks the last accepted spin per player in a lock-free concurrent map.
//! Admission is optimistic: the slot is consumed before the spin's fate is
//! known, so a spin that later fails validation or settlement still spent
//! its cooldown. The map is bounded by an amortized sweep that drops entries
//! idle for longer than the eviction horizon.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// Sweep once every this many admission checks.
const SWEEP_EVERY_OPS: u64 = 4096;

// Entries idle for this many cooldown periods are dropped on sweep.
const EVICTION_HORIZON_COOLDOWNS: u32 = 32;

// Floor for the horizon so a tiny cooldown cannot make the sweep thrash.
const MIN_EVICTION_HORIZON: Duration = Duration::from_secs(60);

pub struct SpinRateLimiter {
    cooldown: Duration,
    last_accepted: DashMap<String, Instant>,
    admissions: AtomicU64,
}

impl SpinRateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: DashMap::new(),
            admissions: AtomicU64::new(0),
        }
    }

    /// Admit or reject a spin attempt at `now`. On admission the player's
    /// slot is updated immediately. Atomic per key: two racing calls for the
    /// same player inside one cooldown window admit exactly one.
    pub fn allow(&self, player_id: &str, now: Instant) -> bool {
        if self.admissions.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY_OPS == 0 {
            self.sweep(now);
        }

        match self.last_accepted.entry(player_id.to_string()) {
            Entry::Occupied(mut slot) => {
                if now.saturating_duration_since(*slot.get()) >= self.cooldown {
                    slot.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
                true
            }
        }
    }

    /// Number of players currently tracked.
    pub fn tracked_players(&self) -> usize {
        self.last_accepted.len()
    }

    fn sweep(&self, now: Instant) {
        let horizon = self
            .cooldown
            .saturating_mul(EVICTION_HORIZON_COOLDOWNS)
            .max(MIN_EVICTION_HORIZON);
        self.last_accepted
            .retain(|_, accepted_at| now.saturating_duration_since(*accepted_at) < horizon);
    }
}
