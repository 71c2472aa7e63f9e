//! Mathematical Utilities for the Settlement Ledger
//!
//! Checked arithmetic and pro-rata distribution math.

use crate::Vec;
use crate::errors::{LedgerError, LedgerResult};
use crate::types::Quantity;

/// Calculate one depositor's cut of a conversion
///
/// cut = floor(received * share / total)
///
/// # Arguments
/// * `received` - Destination units produced by the conversion
/// * `share` - Quantity the depositor contributed
/// * `total` - Sum of all contributions in the batch
///
/// # Returns
/// The depositor's cut in destination units. Never exceeds `received`
/// when `share <= total`.
pub fn pro_rata_share(received: Quantity, share: Quantity, total: Quantity) -> LedgerResult<Quantity> {
    if total == 0 {
        return Err(LedgerError::DivisionByZero);
    }

    // u64 * u64 always fits in u128
    let cut = (received as u128) * (share as u128) / (total as u128);

    u64::try_from(cut).map_err(|_| LedgerError::Overflow)
}

/// Split `received` across `shares` pro rata
///
/// # Returns
/// Per-share cuts in input order, and the dust left over by truncation.
/// Dust is at most `shares.len() - 1` units.
pub fn split_pro_rata(received: Quantity, shares: &[Quantity]) -> LedgerResult<(Vec<Quantity>, Quantity)> {
    let total = sum_quantities(shares)?;

    let mut cuts = Vec::with_capacity(shares.len());
    let mut distributed: Quantity = 0;
    for &share in shares {
        let cut = pro_rata_share(received, share, total)?;
        distributed = safe_add(distributed, cut)?;
        cuts.push(cut);
    }

    let dust = safe_sub(received, distributed)?;
    Ok((cuts, dust))
}

/// Sum quantities, failing on overflow
pub fn sum_quantities(amounts: &[Quantity]) -> LedgerResult<Quantity> {
    amounts
        .iter()
        .try_fold(0u64, |acc, &x| acc.checked_add(x))
        .ok_or(LedgerError::Overflow)
}

/// Safe addition with overflow check
pub fn safe_add(a: Quantity, b: Quantity) -> LedgerResult<Quantity> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

/// Safe subtraction; a negative result is reported as overflow
pub fn safe_sub(a: Quantity, b: Quantity) -> LedgerResult<Quantity> {
    a.checked_sub(b).ok_or(LedgerError::Overflow)
}
