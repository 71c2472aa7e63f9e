//! Core Types for the Pooled Settlement Ledger
//!
//! Identities, call context, the wire-level action enum, and settlement
//! receipts shared between the ledger and its callers.

use crate::Vec;
use crate::constants::NATIVE_ASSET;
use crate::errors::{LedgerError, LedgerResult};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for participant addresses (32-byte identity)
pub type Address = [u8; 32];

/// Type alias for fungible asset identifiers
pub type AssetId = [u8; 32];

/// Type alias for settlement identifiers (SHA-256 digest)
pub type SettlementId = [u8; 32];

/// Quantity of an asset in its smallest unit.
///
/// Products of two quantities are computed in `u128`, so pro-rata math never
/// overflows.
pub type Quantity = u64;

/// Returns true if the asset identifier is the native-currency sentinel
pub fn is_native(asset: &AssetId) -> bool {
    *asset == NATIVE_ASSET
}

// ============ Call Context ============

/// Who is calling, and how much native value arrived with the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CallContext {
    /// Caller identity; deposits always credit this address
    pub caller: Address,
    /// Native value attached to the call
    pub value: Quantity,
}

impl CallContext {
    /// Context for a call carrying no native value
    pub fn new(caller: Address) -> Self {
        Self { caller, value: 0 }
    }

    /// Context for a call carrying `value` of native currency
    pub fn with_value(caller: Address, value: Quantity) -> Self {
        Self { caller, value }
    }
}

// ============ Actions ============

/// Actions accepted by the settlement ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum LedgerAction {
    /// Deposit each `tokens[i]` in quantity `amounts[i]` on the caller's behalf
    Deposit {
        tokens: Vec<AssetId>,
        amounts: Vec<Quantity>,
    },
    /// Convert the pooled `asset` of `users` and pay the proceeds out pro rata
    Settle {
        users: Vec<Address>,
        asset: AssetId,
        declared_amount: Quantity,
        instruction: Vec<u8>,
    },
}

impl LedgerAction {
    /// Encode the action as CBOR
    pub fn to_cbor(&self) -> LedgerResult<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|_| LedgerError::InvalidActionFormat)?;
        Ok(buf)
    }

    /// Decode an action from CBOR
    pub fn from_cbor(bytes: &[u8]) -> LedgerResult<Self> {
        ciborium::from_reader(bytes).map_err(|_| LedgerError::InvalidActionFormat)
    }
}

// ============ Settlement Receipts ============

/// One user's payout from a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Payout {
    /// Depositor being paid
    pub user: Address,
    /// Quantity of the pooled asset the user contributed
    pub share: Quantity,
    /// Quantity of the destination asset paid to the user
    pub amount: Quantity,
}

/// Outcome of a `settle` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct SettlementReceipt {
    /// Deterministic identifier; all zero for an empty-pool no-op
    pub settlement_id: SettlementId,
    /// Asset that was pooled and converted
    pub asset: AssetId,
    /// Sum of the tallied user shares
    pub tallied_total: Quantity,
    /// Quantity offered to the executor
    pub declared_amount: Quantity,
    /// Destination asset received, measured as a balance delta
    pub received: Quantity,
    /// Destination asset paid out to users
    pub distributed: Quantity,
    /// Floor-division remainder retained by the ledger
    pub dust: Quantity,
    /// Tallied quantity never offered to the executor (partial declarations only)
    pub stranded: Quantity,
    /// Per-user payouts, in tally order
    pub payouts: Vec<Payout>,
}

impl SettlementReceipt {
    /// Receipt for a settlement whose tallied pool was empty
    pub fn empty(asset: AssetId) -> Self {
        Self {
            settlement_id: [0u8; 32],
            asset,
            tallied_total: 0,
            declared_amount: 0,
            received: 0,
            distributed: 0,
            dust: 0,
            stranded: 0,
            payouts: Vec::new(),
        }
    }

    /// Returns true if the settlement converted nothing
    pub fn is_empty(&self) -> bool {
        self.tallied_total == 0
    }
}
