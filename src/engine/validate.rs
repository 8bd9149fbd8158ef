//! Structural validation of incoming wager sets.
//!
//! Converts the untyped wire shape into the closed `WagerKind` enum and
//! computes the total stake. Pure: no side effects, and the same input
//! always fails with the same reason.

use crate::engine::types::{Amount, Wager, WagerKind, WagerRequest};
use crate::errors::SpinError;

/// Validate a submitted wager set against the table limit. On success,
/// returns the typed wagers and the exact total stake used for the debit.
pub fn validate_wagers(
    wagers: &[WagerRequest],
    max_total_stake: Amount,
) -> Result<(Vec<Wager>, Amount), SpinError> {
    if wagers.is_empty() {
        return Err(SpinError::InvalidWager(
            "at least one wager is required".to_string(),
        ));
    }

    let mut validated = Vec::with_capacity(wagers.len());
    let mut total_stake: Amount = 0;

    for (index, wager) in wagers.iter().enumerate() {
        let kind = parse_kind(index, wager)?;

        if wager.amount <= 0 {
            return Err(SpinError::InvalidWager(format!(
                "wager {}: stake must be positive, got {}",
                index, wager.amount
            )));
        }
        let stake = wager.amount as Amount;

        total_stake = total_stake.checked_add(stake).ok_or_else(|| {
            SpinError::InvalidWager("total stake overflows".to_string())
        })?;

        validated.push(Wager { kind, stake });
    }

    // Re-asserted at the aggregate level even though the per-wager checks
    // already imply it.
    if total_stake == 0 {
        return Err(SpinError::InvalidWager(
            "total stake must be positive".to_string(),
        ));
    }
    if total_stake > max_total_stake {
        return Err(SpinError::InvalidWager(format!(
            "total stake {} exceeds table limit {}",
            total_stake, max_total_stake
        )));
    }

    Ok((validated, total_stake))
}

fn parse_kind(index: usize, wager: &WagerRequest) -> Result<WagerKind, SpinError> {
    match wager.kind.trim().to_lowercase().as_str() {
        "number" => {
            let value = wager.value.ok_or_else(|| {
                SpinError::InvalidWager(format!(
                    "wager {}: a number wager requires a value",
                    index
                ))
            })?;
            if !(0..=36).contains(&value) {
                return Err(SpinError::InvalidWager(format!(
                    "wager {}: number {} is outside 0..=36",
                    index, value
                )));
            }
            Ok(WagerKind::Number(value as u8))
        }
        "red" => Ok(WagerKind::Red),
        "black" => Ok(WagerKind::Black),
        "odd" => Ok(WagerKind::Odd),
        "even" => Ok(WagerKind::Even),
        "low" => Ok(WagerKind::Low),
        "high" => Ok(WagerKind::High),
        other => Err(SpinError::InvalidWager(format!(
            "wager {}: unrecognized kind '{}'",
            index, other
        ))),
    }
}
