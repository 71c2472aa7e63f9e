//! Pooled Settlement Ledger
//!
//! Custodies deposits from many users and settles them in batches: the
//! pooled quantity of one asset is converted into a single destination
//! asset through an external exchange executor, and the proceeds are paid
//! back pro rata.
//!
//! ## Trust Model
//!
//! - The ledger never moves value itself; an `AssetTransferService` does
//! - The executor is untrusted: it gets a bounded grant for one call and the
//!   ledger measures only what actually arrived
//! - Every entry point is all-or-nothing
//!
//! ## Example
//!
//! ```rust,ignore
//! let config = LedgerConfig::new(ledger_addr, usd, router_addr)?;
//! let mut ledger = SettlementLedger::new(config);
//!
//! ledger.deposit(&CallContext::new(alice), &[token], &[10], &mut assets)?;
//! let receipt = ledger.settle(&ctx, &[alice], &token, 10, &[], &mut assets, &mut router)?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod config;
pub mod executor;
mod journal;
pub mod ledger;

#[cfg(test)]
mod test_support;


pub use config::{DeclaredAmountPolicy, LedgerConfig, SettleAccess};
pub use executor::ExchangeExecutor;
pub use ledger::{derive_settlement_id, DispatchOutcome, SettlementLedger};
