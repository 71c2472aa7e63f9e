//! Pooled Settlement Common Library
//!
//! Shared types, constants, and utilities for the pooled settlement ledger.
//!
//! ## Model
//!
//! Users deposit arbitrary assets into a shared pool held by the ledger.
//! An operator later converts the pooled quantity of one asset into a single
//! destination asset through an untrusted exchange executor, and the proceeds
//! are paid back to the depositors pro rata to what each of them put in.
//!
//! This crate holds everything that is not the ledger itself:
//!
//! - **Types**: addresses, asset identifiers, call context, wire actions
//! - **Errors**: the `LedgerError` taxonomy with stable codes
//! - **Events**: indexer-facing records collected in an `EventLog`
//! - **Math**: checked sums and floor-division pro-rata shares
//! - **Validation**: `check!` and `require_*` helpers
//! - **Ports**: the `AssetTransferService` collaborator contract
//! - **Asset Book**: an in-memory, journaled `AssetTransferService`
//!
//! This crate is `no_std` compatible (with `alloc`) when the default `std`
//! feature is disabled.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod validation;
pub mod ports;
pub mod asset_book;

// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use ports::*;
pub use asset_book::AssetBook;
