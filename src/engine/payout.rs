//! Fixed-odds payout table for the European single-zero wheel.
//!
//! Payout figures include the returned stake: a winning even-money wager
//! pays 2x its stake, a winning straight-up wager pays 36x. Zero is neither
//! red nor black, neither odd nor even, neither low nor high, so it loses
//! every even-money wager.

use crate::engine::types::{Amount, Wager, WagerKind};

/// Red pockets. Every other pocket in 1..=36 is black; zero is neither.
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// Payout multiple for a winning straight-up wager, stake included.
pub const STRAIGHT_UP_MULTIPLE: u64 = 36;

/// Payout multiple for a winning even-money wager, stake included.
pub const EVEN_MONEY_MULTIPLE: u64 = 2;

pub fn is_red(number: u8) -> bool {
    RED_NUMBERS.contains(&number)
}

/// Payout for one wager against a drawn outcome. Zero-stake wagers pay
/// nothing even if the validator was bypassed.
pub fn wager_payout(wager: &Wager, outcome: u8) -> Amount {
    if wager.stake == 0 {
        return 0;
    }
    let multiple = match wager.kind {
        WagerKind::Number(number) => {
            if outcome == number {
                STRAIGHT_UP_MULTIPLE
            } else {
                0
            }
        }
        WagerKind::Red => {
            if outcome != 0 && is_red(outcome) {
                EVEN_MONEY_MULTIPLE
            } else {
                0
            }
        }
        WagerKind::Black => {
            if outcome != 0 && !is_red(outcome) {
                EVEN_MONEY_MULTIPLE
            } else {
                0
            }
        }
        WagerKind::Odd => {
            if outcome != 0 && outcome % 2 == 1 {
                EVEN_MONEY_MULTIPLE
            } else {
                0
            }
        }
        WagerKind::Even => {
            if outcome != 0 && outcome % 2 == 0 {
                EVEN_MONEY_MULTIPLE
            } else {
                0
            }
        }
        WagerKind::Low => {
            if (1..=18).contains(&outcome) {
                EVEN_MONEY_MULTIPLE
            } else {
                0
            }
        }
        WagerKind::High => {
            if (19..=36).contains(&outcome) {
                EVEN_MONEY_MULTIPLE
            } else {
                0
            }
        }
    };
    // Exact for any stake below the table limit; saturation only guards
    // direct calls with unvalidated wagers.
    wager.stake.saturating_mul(multiple)
}

/// Total payout for a wager set: the sum of every wager's individual payout.
pub fn total_payout(wagers: &[Wager], outcome: u8) -> Amount {
    wagers
        .iter()
        .fold(0, |total: Amount, wager| total.saturating_add(wager_payout(wager, outcome)))
}
