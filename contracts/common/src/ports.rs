//! Collaborator Ports
//!
//! The ledger never moves value itself. It drives an `AssetTransferService`
//! for every pull, push, allowance and balance read, and hands conversion
//! off to an exchange executor it does not trust.
//!
//! ## All-or-nothing
//!
//! A call into the ledger either takes full effect or none. The transfer
//! service therefore exposes checkpoints: the ledger takes one when a call
//! starts, rolls back to it if the call fails, and commits it otherwise.
//! Checkpoints nest, so a call re-entered from inside an exchange can fail
//! on its own without unwinding the outer call.

use core::fmt;

use crate::types::{Address, AssetId, Quantity};

/// Opaque marker returned by `AssetTransferService::checkpoint`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(pub usize);

/// Why a transfer was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFailure {
    /// Source holds less than the requested quantity
    InsufficientBalance { available: Quantity, requested: Quantity },
    /// Spender's allowance is below the requested quantity
    InsufficientAllowance { available: Quantity, requested: Quantity },
    /// Recipient balance would overflow
    Overflow,
    /// Refused for a service-specific reason
    Rejected,
}

impl TransferFailure {
    /// Returns true if the holder can fix this by funding or approving more
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBalance { .. } | Self::InsufficientAllowance { .. }
        )
    }
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientBalance { available, requested } => {
                write!(f, "insufficient balance ({} < {})", available, requested)
            }
            Self::InsufficientAllowance { available, requested } => {
                write!(f, "insufficient allowance ({} < {})", available, requested)
            }
            Self::Overflow => f.write_str("recipient balance overflow"),
            Self::Rejected => f.write_str("transfer rejected"),
        }
    }
}

/// Why an exchange call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorFault {
    /// The executor reverted
    Reverted,
    /// The instruction was not understood
    MalformedInstruction,
    /// A transfer performed by the executor failed
    Transfer(TransferFailure),
    /// A call the executor made back into the ledger failed
    Reentry(&'static str),
}

impl fmt::Display for ExecutorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reverted => f.write_str("executor reverted"),
            Self::MalformedInstruction => f.write_str("malformed exchange instruction"),
            Self::Transfer(reason) => write!(f, "executor transfer failed: {}", reason),
            Self::Reentry(code) => write!(f, "reentrant ledger call failed: {}", code),
        }
    }
}

/// Fungible value movement, as consumed by the ledger.
///
/// Every mutating method is atomic: on `Err` nothing moved.
pub trait AssetTransferService {
    /// Move `amount` of `asset` from `from` to `to`, spending `spender`'s allowance
    fn pull(
        &mut self,
        asset: &AssetId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Quantity,
    ) -> Result<(), TransferFailure>;

    /// Move `amount` of `asset` held by `from` to `to`
    fn push(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: Quantity,
    ) -> Result<(), TransferFailure>;

    /// Set `spender`'s allowance over `owner`'s `asset` to exactly `amount`
    fn approve(
        &mut self,
        asset: &AssetId,
        owner: &Address,
        spender: &Address,
        amount: Quantity,
    ) -> Result<(), TransferFailure>;

    /// Quantity of `asset` held by `holder`
    fn balance_of(&self, asset: &AssetId, holder: &Address) -> Quantity;

    /// Current allowance of `spender` over `owner`'s `asset`
    fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> Quantity;

    /// Open an all-or-nothing scope
    fn checkpoint(&mut self) -> Checkpoint;

    /// Undo everything done since `checkpoint`
    fn rollback(&mut self, checkpoint: Checkpoint);

    /// Close the scope opened at `checkpoint`, keeping its effects
    fn commit(&mut self, checkpoint: Checkpoint);
}

/// What the ledger hands to the exchange executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeCall<'a> {
    /// The ledger's own custody address (source of input, sink of output)
    pub ledger: Address,
    /// Asset being converted
    pub asset: AssetId,
    /// Asset the ledger expects to receive
    pub destination: AssetId,
    /// Maximum input the executor may consume
    pub amount: Quantity,
    /// Native value forwarded with the call (native input only)
    pub value: Quantity,
    /// Opaque, caller-supplied instruction
    pub instruction: &'a [u8],
}
