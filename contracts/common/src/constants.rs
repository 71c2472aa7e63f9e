//! Ledger Constants
//!
//! Reserved identifiers and default bounds for the settlement ledger.

use crate::types::{Address, AssetId};

/// The null address. Never a valid ledger, executor, or destination identity.
pub const NULL_ADDRESS: Address = [0u8; 32];

/// Sentinel asset identifier standing in for the chain's native currency.
///
/// Native value travels with the call itself, so no allowance or pull step
/// is involved when this asset is deposited.
pub const NATIVE_ASSET: AssetId = [0xEE; 32];

/// Batch limits
pub mod limits {
    /// Default maximum number of users tallied in a single settlement
    pub const DEFAULT_MAX_BATCH_USERS: usize = 256;

    /// Maximum number of (token, amount) entries in a single deposit call
    pub const MAX_DEPOSIT_ENTRIES: usize = 64;
}

/// Domain separation tag for settlement identifiers
pub const SETTLEMENT_ID_DOMAIN: &[u8] = b"pooled-settlement/v1/settlement";
