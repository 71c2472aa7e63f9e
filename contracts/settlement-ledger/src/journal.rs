//! Balance Journal
//!
//! Records the prior value of every ledger entry touched inside an open
//! call, so a failing call can be unwound exactly. Scopes nest: each call,
//! including one re-entered from an exchange, opens its own scope at the
//! current journal length.

use pooled_settlement_common::{
    types::{Address, AssetId, Quantity},
    Vec,
};

/// Prior value of one mutated piece of ledger state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JournalEntry {
    /// UserBalance[user][asset] before the write
    Balance { user: Address, asset: AssetId, previous: Quantity },
    /// Settlement counter before it was bumped
    Nonce { previous: u64 },
}

/// Undo log for the ledger's own state
#[derive(Debug, Clone, Default)]
pub(crate) struct Journal {
    entries: Vec<JournalEntry>,
    depth: usize,
}

impl Journal {
    /// Open a scope; returns its mark
    pub fn open(&mut self) -> usize {
        self.depth += 1;
        self.entries.len()
    }

    /// Returns true if at least one scope is open
    pub fn is_recording(&self) -> bool {
        self.depth > 0
    }

    /// Record a prior value
    pub fn record(&mut self, entry: JournalEntry) {
        if self.is_recording() {
            self.entries.push(entry);
        }
    }

    /// Pop the most recent entry recorded after `mark`
    pub fn pop_above(&mut self, mark: usize) -> Option<JournalEntry> {
        if self.entries.len() > mark {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Close a scope, keeping its effects
    pub fn commit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.entries.clear();
        }
    }

    /// Close a scope after its entries were popped
    pub fn abandon(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
