//! Exchange Executor Port
//!
//! The executor is an external, untrusted principal. The ledger grants it a
//! bounded allowance (or forwards bounded native value) for one call, and
//! afterwards trusts nothing but the change in its own destination-asset
//! holdings.
//!
//! The executor receives the ledger itself for the duration of the call, so
//! it can re-enter `deposit` or `settle`. Balances included in the outer
//! settlement are already zero by then.

use pooled_settlement_common::{
    ports::{AssetTransferService, ExchangeCall, ExecutorFault},
    types::Address,
};

use crate::ledger::SettlementLedger;

/// Converts a quantity of one asset into the ledger's destination asset
pub trait ExchangeExecutor<A: AssetTransferService> {
    /// Address the executor acts under; must match the configured executor
    fn address(&self) -> Address;

    /// Perform the conversion described by `call`.
    ///
    /// Input is available either as an allowance over the ledger's
    /// `call.asset` holdings or, for native input, as `call.value` already
    /// moved to the executor. Output is expected at `call.ledger`.
    fn execute(
        &mut self,
        call: &ExchangeCall<'_>,
        ledger: &mut SettlementLedger,
        assets: &mut A,
    ) -> Result<(), ExecutorFault>;
}
