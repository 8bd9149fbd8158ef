//! Outcome drawing for the single-zero wheel.
//!
//! Outcomes come from the operating system CSPRNG with rejection sampling,
//! so every pocket is exactly equally likely. If the entropy source fails,
//! the draw fails hard; there is no fallback to a statistical generator.

use crate::errors::SpinError;
use rand_core::{OsRng, RngCore};

/// Number of pockets on the wheel; outcomes are `0..WHEEL_SLOTS`.
pub const WHEEL_SLOTS: u8 = 37;

// Largest multiple of 37 that fits in a byte (222). Bytes at or above this
// are rejected so the modulo below introduces no bias.
const REJECTION_BOUND: u8 = WHEEL_SLOTS * (u8::MAX / WHEEL_SLOTS);

/// Source of winning pockets. Stateless implementations are shared across
/// all concurrent spins.
pub trait OutcomeSource: Send + Sync {
    /// Draw a uniformly distributed outcome in `0..=36`.
    fn draw(&self) -> Result<u8, SpinError>;
}

/// Outcome source backed by the operating system CSPRNG.
pub struct OsEntropySource;

impl OutcomeSource for OsEntropySource {
    fn draw(&self) -> Result<u8, SpinError> {
        let mut byte = [0u8; 1];
        loop {
            OsRng
                .try_fill_bytes(&mut byte)
                .map_err(|e| SpinError::EntropyUnavailable(e.to_string()))?;
            if byte[0] < REJECTION_BOUND {
                return Ok(byte[0] % WHEEL_SLOTS);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_bound_is_exact_multiple() {
        assert_eq!(REJECTION_BOUND, 222);
        assert_eq!(REJECTION_BOUND % WHEEL_SLOTS, 0);
    }

    #[test]
    fn test_draws_stay_in_range() {
        let wheel = OsEntropySource;
        for _ in 0..10_000 {
            let outcome = wheel.draw().expect("entropy available");
            assert!(outcome <= 36);
        }
    }

    /// Chi-square goodness-of-fit over 370k draws (expected 10k per pocket).
    /// The critical value is far above the 99.9th percentile for 36 degrees
    /// of freedom (~68), so the test is deterministic in practice while still
    /// catching gross bias such as an unrejected modulo.
    #[test]
    fn test_draw_distribution_is_uniform() {
        const DRAWS: u64 = 370_000;
        const EXPECTED: f64 = DRAWS as f64 / WHEEL_SLOTS as f64;

        let wheel = OsEntropySource;
        let mut counts = [0u64; WHEEL_SLOTS as usize];
        for _ in 0..DRAWS {
            counts[wheel.draw().expect("entropy available") as usize] += 1;
        }

        let chi_square: f64 = counts
            .iter()
            .map(|&observed| {
                let diff = observed as f64 - EXPECTED;
                diff * diff / EXPECTED
            })
            .sum();

        assert!(
            chi_square < 100.0,
            "outcome distribution is biased: chi-square = {:.2}, counts = {:?}",
            chi_square,
            counts
        );
    }
}
