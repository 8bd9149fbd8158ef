//! Settlement metrics.
//!
//! Atomic counters rendered in Prometheus text exposition format and served
//! at `/metrics`.

use crate::engine::types::SettlementResult;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct MetricsRegistry {
    spins_settled_total: AtomicU64,
    spins_rejected_total: AtomicU64,
    spins_won_total: AtomicU64,
    staked_units_total: AtomicU64,
    paid_out_units_total: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_settlement(&self, result: &SettlementResult) {
        self.spins_settled_total.fetch_add(1, Ordering::Relaxed);
        if result.total_payout > 0 {
            self.spins_won_total.fetch_add(1, Ordering::Relaxed);
        }
        self.staked_units_total
            .fetch_add(result.total_stake, Ordering::Relaxed);
        self.paid_out_units_total
            .fetch_add(result.total_payout, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.spins_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Render all counters in Prometheus text format.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(1024);

        let counters = [
            (
                "wheelhouse_spins_settled_total",
                "Spins settled and committed",
                self.spins_settled_total.load(Ordering::Relaxed),
            ),
            (
                "wheelhouse_spins_rejected_total",
                "Spin requests rejected before commit",
                self.spins_rejected_total.load(Ordering::Relaxed),
            ),
            (
                "wheelhouse_spins_won_total",
                "Settled spins with a positive payout",
                self.spins_won_total.load(Ordering::Relaxed),
            ),
            (
                "wheelhouse_staked_units_total",
                "Total stake debited, in minor currency units",
                self.staked_units_total.load(Ordering::Relaxed),
            ),
            (
                "wheelhouse_paid_out_units_total",
                "Total payout credited, in minor currency units",
                self.paid_out_units_total.load(Ordering::Relaxed),
            ),
        ];

        for (name, help, value) in counters {
            out.push_str(&format!("# HELP {} {}\n", name, help));
            out.push_str(&format!("# TYPE {} counter\n", name));
            out.push_str(&format!("{} {}\n", name, value));
        }

        out
    }
}
