//! Ledger Configuration
//!
//! Fixed at construction and immutable for the lifetime of the ledger.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use pooled_settlement_common::{
    check,
    constants::limits,
    errors::{LedgerError, LedgerResult},
    types::{Address, AssetId},
    validation::require_valid_address,
    Vec,
};

/// How `settle` treats a declared amount that differs from the tallied pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum DeclaredAmountPolicy {
    /// Reject any settlement whose declared amount is not the tallied total
    #[default]
    RequireExact,
    /// Accept any declared amount; the unconverted remainder is stranded
    /// in custody with no owner and reported on the receipt
    AllowPartial,
}

/// Who may trigger a settlement
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum SettleAccess {
    /// Any caller may settle any user's balance
    #[default]
    Open,
    /// Only the listed operators may settle
    Operators(Vec<Address>),
}

impl SettleAccess {
    /// Returns true if `caller` may trigger a settlement
    pub fn permits(&self, caller: &Address) -> bool {
        match self {
            Self::Open => true,
            Self::Operators(operators) => operators.contains(caller),
        }
    }
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LedgerConfig {
    /// The ledger's own custody address
    pub ledger_address: Address,
    /// Asset every settlement is converted into
    pub destination_asset: AssetId,
    /// The only executor settlements may call
    pub exchange_executor: Address,
    /// Declared-amount handling
    pub declared_amount_policy: DeclaredAmountPolicy,
    /// Settlement access policy
    pub settle_access: SettleAccess,
    /// Maximum users tallied per settlement
    pub max_batch_users: usize,
}

impl LedgerConfig {
    /// Creates a configuration with default policies.
    ///
    /// # Arguments
    /// * `ledger_address` - Identity under which the ledger holds custody
    /// * `destination_asset` - Asset all settlement proceeds are paid in
    /// * `exchange_executor` - Address of the external exchange executor
    ///
    /// # Errors
    /// Returns `LedgerError::InvalidAddress` if any argument is the null
    /// address, or if the executor is the ledger itself.
    pub fn new(
        ledger_address: Address,
        destination_asset: AssetId,
        exchange_executor: Address,
    ) -> LedgerResult<Self> {
        require_valid_address(&ledger_address, "ledger address cannot be null")?;
        require_valid_address(&destination_asset, "destination asset cannot be null")?;
        require_valid_address(&exchange_executor, "exchange executor cannot be null")?;
        check!(
            exchange_executor != ledger_address,
            LedgerError::InvalidAddress { reason: "exchange executor cannot be the ledger itself" }
        );

        Ok(Self {
            ledger_address,
            destination_asset,
            exchange_executor,
            declared_amount_policy: DeclaredAmountPolicy::default(),
            settle_access: SettleAccess::default(),
            max_batch_users: limits::DEFAULT_MAX_BATCH_USERS,
        })
    }

    /// Use `policy` for declared-amount mismatches
    pub fn with_declared_amount_policy(mut self, policy: DeclaredAmountPolicy) -> Self {
        self.declared_amount_policy = policy;
        self
    }

    /// Use `access` to gate settlements
    pub fn with_settle_access(mut self, access: SettleAccess) -> Self {
        self.settle_access = access;
        self
    }

    /// Cap settlement batches at `max` users; never above `u32::MAX`, the
    /// width of the batch count carried on settlement events
    pub fn with_max_batch_users(mut self, max: usize) -> Self {
        self.max_batch_users = max.min(u32::MAX as usize);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pooled_settlement_common::NULL_ADDRESS;

    #[test]
    fn test_new_config_defaults() {
        let config = LedgerConfig::new([10u8; 32], [20u8; 32], [30u8; 32]).unwrap();
        assert_eq!(config.declared_amount_policy, DeclaredAmountPolicy::RequireExact);
        assert_eq!(config.settle_access, SettleAccess::Open);
        assert_eq!(config.max_batch_users, limits::DEFAULT_MAX_BATCH_USERS);
    }

    #[test]
    fn test_null_addresses_rejected() {
        assert!(matches!(
            LedgerConfig::new(NULL_ADDRESS, [20u8; 32], [30u8; 32]),
            Err(LedgerError::InvalidAddress { .. })
        ));
        assert!(matches!(
            LedgerConfig::new([10u8; 32], NULL_ADDRESS, [30u8; 32]),
            Err(LedgerError::InvalidAddress { reason: "destination asset cannot be null" })
        ));
        assert!(matches!(
            LedgerConfig::new([10u8; 32], [20u8; 32], NULL_ADDRESS),
            Err(LedgerError::InvalidAddress { reason: "exchange executor cannot be null" })
        ));
    }

    #[test]
    fn test_executor_cannot_be_ledger() {
        let result = LedgerConfig::new([10u8; 32], [20u8; 32], [10u8; 32]);
        assert_eq!(
            result,
            Err(LedgerError::InvalidAddress { reason: "exchange executor cannot be the ledger itself" })
        );
    }

    #[test]
    fn test_batch_cap_fits_event_width() {
        let config = LedgerConfig::new([10u8; 32], [20u8; 32], [30u8; 32])
            .unwrap()
            .with_max_batch_users(usize::MAX);
        assert!(u32::try_from(config.max_batch_users).is_ok());

        let config = config.with_max_batch_users(3);
        assert_eq!(config.max_batch_users, 3);
    }

    #[test]
    fn test_operator_access() {
        let access = SettleAccess::Operators(vec![[5u8; 32]]);
        assert!(access.permits(&[5u8; 32]));
        assert!(!access.permits(&[6u8; 32]));
        assert!(SettleAccess::Open.permits(&[6u8; 32]));
    }
}
