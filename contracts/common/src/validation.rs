//! Validation Helpers
//!
//! - `check!` macro for early-return validation
//! - `require_*` helpers shared by the ledger entry points
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pooled_settlement_common::check;
//!
//! check!(declared == total, LedgerError::DeclaredAmountMismatch { declared, tallied: total });
//! ```

use crate::{
    constants::NULL_ADDRESS,
    errors::{LedgerError, LedgerResult},
    types::Address,
};

// ============ Validation Macro ============

/// Check a condition and return an error if it fails.
///
/// Expands to an early `return Err(..)`, so it can only be used inside
/// functions returning `Result`.
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use crate::check;

// ============ Common Validation Helpers ============

/// Require address to not be null.
pub fn require_valid_address(address: &Address, reason: &'static str) -> LedgerResult<()> {
    if *address == NULL_ADDRESS {
        return Err(LedgerError::InvalidAddress { reason });
    }
    Ok(())
}

/// Require two parallel sequences to have equal length.
pub fn require_equal_lengths(tokens: usize, amounts: usize) -> LedgerResult<()> {
    if tokens != amounts {
        return Err(LedgerError::LengthMismatch { tokens, amounts });
    }
    Ok(())
}

/// Require a batch to fit within `maximum` entries.
pub fn require_batch_size(size: usize, maximum: usize) -> LedgerResult<()> {
    if size > maximum {
        return Err(LedgerError::BatchTooLarge { size, maximum });
    }
    Ok(())
}
