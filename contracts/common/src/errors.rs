//! Error Types for the Pooled Settlement Ledger
//!
//! Every error is fatal to the call that raised it: the ledger unwinds all
//! balance changes, transfers, and events made earlier in the same call.

use core::fmt;

use crate::ports::{ExecutorFault, TransferFailure};
use crate::types::{Address, AssetId};

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Main error enum for all ledger errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ============ Input Errors ============
    /// `tokens` and `amounts` differ in length
    LengthMismatch { tokens: usize, amounts: usize },

    /// Native deposit entries exceed the value attached to the call
    InsufficientNativeValue { attached: u64, required: u64 },

    /// Too many entries in a single batch
    BatchTooLarge { size: usize, maximum: usize },

    /// Invalid input parameter
    InvalidInput { param: &'static str, reason: &'static str },

    /// Encoded action could not be decoded
    InvalidActionFormat,

    // ============ Collaborator Errors ============
    /// Asset pull/push failed in the transfer service
    TransferFailed {
        asset: AssetId,
        from: Address,
        to: Address,
        amount: u64,
        reason: TransferFailure,
    },

    /// Exchange call reverted or signaled failure
    ExecutorCallFailed { executor: Address, fault: ExecutorFault },

    /// Destination holdings went down across the exchange call
    DestinationBalanceDecreased { before: u64, after: u64 },

    // ============ Policy Errors ============
    /// Declared conversion amount differs from the tallied pool
    DeclaredAmountMismatch { declared: u64, tallied: u64 },

    /// Caller may not trigger settlements
    Unauthorized { caller: Address },

    // ============ Configuration Errors ============
    /// Null or mismatched address
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Division by zero
    DivisionByZero,
}

impl LedgerError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::LengthMismatch { .. } => "E010_LENGTH_MISMATCH",
            Self::InsufficientNativeValue { .. } => "E011_INSUFFICIENT_NATIVE",
            Self::BatchTooLarge { .. } => "E012_BATCH_TOO_LARGE",
            Self::InvalidInput { .. } => "E013_INVALID_INPUT",
            Self::InvalidActionFormat => "E014_INVALID_ACTION",
            Self::TransferFailed { .. } => "E020_TRANSFER_FAILED",
            Self::ExecutorCallFailed { .. } => "E021_EXECUTOR_FAILED",
            Self::DestinationBalanceDecreased { .. } => "E022_DEST_DECREASED",
            Self::DeclaredAmountMismatch { .. } => "E030_DECLARED_MISMATCH",
            Self::Unauthorized { .. } => "E031_UNAUTHORIZED",
            Self::InvalidAddress { .. } => "E040_INVALID_ADDRESS",
            Self::Overflow => "E080_OVERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
        }
    }

    /// Returns true if the caller can fix the input and resubmit
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::LengthMismatch { .. } => true,
            Self::InsufficientNativeValue { .. } => true, // Attach more value
            Self::BatchTooLarge { .. } => true,           // Split the batch
            Self::DeclaredAmountMismatch { .. } => true,  // Declare the tallied total
            Self::TransferFailed { reason, .. } => reason.is_recoverable(),
            _ => false,
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { tokens, amounts } => {
                write!(f, "{}: {} tokens but {} amounts", self.code(), tokens, amounts)
            }
            Self::InsufficientNativeValue { attached, required } => {
                write!(f, "{}: attached {}, required {}", self.code(), attached, required)
            }
            Self::BatchTooLarge { size, maximum } => {
                write!(f, "{}: {} entries, maximum {}", self.code(), size, maximum)
            }
            Self::InvalidInput { param, reason } => write!(f, "{}: {}: {}", self.code(), param, reason),
            Self::TransferFailed { amount, reason, .. } => {
                write!(f, "{}: moving {}: {}", self.code(), amount, reason)
            }
            Self::ExecutorCallFailed { fault, .. } => write!(f, "{}: {}", self.code(), fault),
            Self::DestinationBalanceDecreased { before, after } => {
                write!(f, "{}: {} -> {}", self.code(), before, after)
            }
            Self::DeclaredAmountMismatch { declared, tallied } => {
                write!(f, "{}: declared {}, tallied {}", self.code(), declared, tallied)
            }
            Self::InvalidAddress { reason } => write!(f, "{}: {}", self.code(), reason),
            _ => f.write_str(self.code()),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LedgerError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_error_codes_unique() {
        let errors = [
            LedgerError::LengthMismatch { tokens: 1, amounts: 2 },
            LedgerError::InsufficientNativeValue { attached: 1, required: 2 },
            LedgerError::BatchTooLarge { size: 300, maximum: 256 },
            LedgerError::InvalidInput { param: "users", reason: "empty" },
            LedgerError::InvalidActionFormat,
            LedgerError::TransferFailed {
                asset: [1u8; 32],
                from: [2u8; 32],
                to: [3u8; 32],
                amount: 5,
                reason: TransferFailure::Rejected,
            },
            LedgerError::ExecutorCallFailed { executor: [4u8; 32], fault: ExecutorFault::Reverted },
            LedgerError::DestinationBalanceDecreased { before: 2, after: 1 },
            LedgerError::DeclaredAmountMismatch { declared: 1, tallied: 2 },
            LedgerError::Unauthorized { caller: [9u8; 32] },
            LedgerError::InvalidAddress { reason: "null" },
            LedgerError::Overflow,
            LedgerError::DivisionByZero,
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_recoverable_follows_transfer_reason() {
        let underfunded = LedgerError::TransferFailed {
            asset: [1u8; 32],
            from: [2u8; 32],
            to: [3u8; 32],
            amount: 5,
            reason: TransferFailure::InsufficientAllowance { available: 0, requested: 5 },
        };
        assert!(underfunded.is_recoverable());
        assert!(!LedgerError::Overflow.is_recoverable());
    }

    #[test]
    fn test_display_includes_code() {
        let err = LedgerError::LengthMismatch { tokens: 2, amounts: 1 };
        assert_eq!(err.to_string(), "E010_LENGTH_MISMATCH: 2 tokens but 1 amounts");
    }
}
