//! In-Memory Asset Book
//!
//! A self-contained `AssetTransferService`: balances per (asset, holder),
//! allowances per (asset, owner, spender), and an undo journal that backs
//! nested checkpoints. Native currency is just another asset here, keyed by
//! `NATIVE_ASSET`.
//!
//! Used to run the ledger off-chain (simulation, reconciliation replays) and
//! throughout the test suites.

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use crate::Vec;
use crate::ports::{AssetTransferService, Checkpoint, TransferFailure};
use crate::types::{Address, AssetId, Quantity};

type BalanceKey = (AssetId, Address);
type AllowanceKey = (AssetId, Address, Address);

/// Prior value of one touched entry
#[derive(Debug, Clone)]
enum BookEntry {
    Balance { key: BalanceKey, previous: Quantity },
    Allowance { key: AllowanceKey, previous: Quantity },
}

/// In-memory asset custody with checkpoint/rollback support
#[derive(Debug, Clone, Default)]
pub struct AssetBook {
    balances: BTreeMap<BalanceKey, Quantity>,
    allowances: BTreeMap<AllowanceKey, Quantity>,
    journal: Vec<BookEntry>,
    depth: usize,
}

impl AssetBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `holder` out of thin air
    pub fn mint(&mut self, asset: &AssetId, holder: &Address, amount: Quantity) -> Result<(), TransferFailure> {
        let credited = self
            .balance_of(asset, holder)
            .checked_add(amount)
            .ok_or(TransferFailure::Overflow)?;
        self.write_balance(asset, holder, credited);
        Ok(())
    }

    /// Sum of all balances of `asset`
    pub fn total_supply(&self, asset: &AssetId) -> u128 {
        self.balances
            .iter()
            .filter(|((a, _), _)| a == asset)
            .map(|(_, &q)| q as u128)
            .sum()
    }

    /// Number of open checkpoints
    pub fn open_scopes(&self) -> usize {
        self.depth
    }

    fn write_balance(&mut self, asset: &AssetId, holder: &Address, amount: Quantity) {
        let key = (*asset, *holder);
        let previous = self.balances.get(&key).copied().unwrap_or(0);
        if self.depth > 0 {
            self.journal.push(BookEntry::Balance { key, previous });
        }
        if amount == 0 {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key, amount);
        }
    }

    fn write_allowance(&mut self, asset: &AssetId, owner: &Address, spender: &Address, amount: Quantity) {
        let key = (*asset, *owner, *spender);
        let previous = self.allowances.get(&key).copied().unwrap_or(0);
        if self.depth > 0 {
            self.journal.push(BookEntry::Allowance { key, previous });
        }
        if amount == 0 {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    /// Validate fully, then write; never leaves a half-applied move
    fn move_balance(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: Quantity,
    ) -> Result<(), TransferFailure> {
        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(TransferFailure::InsufficientBalance { available, requested: amount });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(TransferFailure::Overflow)?;

        self.write_balance(asset, from, available - amount);
        self.write_balance(asset, to, credited);
        Ok(())
    }

    fn undo(&mut self, entry: BookEntry) {
        match entry {
            BookEntry::Balance { key, previous } => {
                if previous == 0 {
                    self.balances.remove(&key);
                } else {
                    self.balances.insert(key, previous);
                }
            }
            BookEntry::Allowance { key, previous } => {
                if previous == 0 {
                    self.allowances.remove(&key);
                } else {
                    self.allowances.insert(key, previous);
                }
            }
        }
    }
}

impl AssetTransferService for AssetBook {
    fn pull(
        &mut self,
        asset: &AssetId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Quantity,
    ) -> Result<(), TransferFailure> {
        let allowed = self.allowance(asset, from, spender);
        if allowed < amount {
            return Err(TransferFailure::InsufficientAllowance { available: allowed, requested: amount });
        }
        self.move_balance(asset, from, to, amount)?;
        self.write_allowance(asset, from, spender, allowed - amount);
        Ok(())
    }

    fn push(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: Quantity,
    ) -> Result<(), TransferFailure> {
        self.move_balance(asset, from, to, amount)
    }

    fn approve(
        &mut self,
        asset: &AssetId,
        owner: &Address,
        spender: &Address,
        amount: Quantity,
    ) -> Result<(), TransferFailure> {
        self.write_allowance(asset, owner, spender, amount);
        Ok(())
    }

    fn balance_of(&self, asset: &AssetId, holder: &Address) -> Quantity {
        self.balances.get(&(*asset, *holder)).copied().unwrap_or(0)
    }

    fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> Quantity {
        self.allowances.get(&(*asset, *owner, *spender)).copied().unwrap_or(0)
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.depth += 1;
        Checkpoint(self.journal.len())
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.0 {
            if let Some(entry) = self.journal.pop() {
                self.undo(entry);
            }
        }
        self.depth = self.depth.saturating_sub(1);
    }

    fn commit(&mut self, _checkpoint: Checkpoint) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.journal.clear();
        }
    }
}
