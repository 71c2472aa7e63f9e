//! Ledger Events
//!
//! Events are emitted during ledger execution and can be indexed
//! off-chain for accounting and reconciliation. Events raised inside a
//! call that later aborts are discarded together with its other effects.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, AssetId, Quantity, SettlementId};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Custody Events (0x01 - 0x1F)
    Deposited = 0x01,

    // Settlement Events (0x20 - 0x3F)
    Distributed = 0x20,
    SettlementExecuted = 0x21,
}

/// Main event enum containing all ledger events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum LedgerEvent {
    /// Emitted once per successful deposit call
    Deposited {
        user: Address,
        tokens: Vec<AssetId>,
        amounts: Vec<Quantity>,
    },

    /// Emitted once per user per settlement
    Distributed {
        settlement_id: SettlementId,
        user: Address,
        asset: AssetId,
        share: Quantity,
        amount: Quantity,
    },

    /// Emitted once per non-empty settlement, after all distributions
    SettlementExecuted {
        settlement_id: SettlementId,
        asset: AssetId,
        declared_amount: Quantity,
        tallied_total: Quantity,
        received: Quantity,
        distributed: Quantity,
        dust: Quantity,
        users: u32,
    },
}

impl LedgerEvent {
    /// Get the event type
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Deposited { .. } => EventType::Deposited,
            Self::Distributed { .. } => EventType::Distributed,
            Self::SettlementExecuted { .. } => EventType::SettlementExecuted,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take ownership of all events, leaving the log empty
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        core::mem::take(&mut self.events)
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&LedgerEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Drop every event emitted after the log held `len` events
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distributed(user: Address, amount: Quantity) -> LedgerEvent {
        LedgerEvent::Distributed {
            settlement_id: [9u8; 32],
            user,
            asset: [7u8; 32],
            share: 10,
            amount,
        }
    }

    #[test]
    fn test_event_type() {
        let event = LedgerEvent::Deposited {
            user: [2u8; 32],
            tokens: vec![[7u8; 32]],
            amounts: vec![10],
        };
        assert_eq!(event.event_type(), EventType::Deposited);
        assert_eq!(distributed([2u8; 32], 20).event_type(), EventType::Distributed);
    }

    #[test]
    fn test_event_serialization() {
        let event = LedgerEvent::SettlementExecuted {
            settlement_id: [9u8; 32],
            asset: [7u8; 32],
            declared_amount: 15,
            tallied_total: 15,
            received: 31,
            distributed: 30,
            dust: 1,
            users: 2,
        };

        let bytes = event.to_bytes();
        let restored = LedgerEvent::from_bytes(&bytes).unwrap();

        assert_eq!(event, restored);
    }

    #[test]
    fn test_event_log_truncate() {
        let mut log = EventLog::new();
        log.emit(distributed([2u8; 32], 20));
        let mark = log.len();
        log.emit(distributed([3u8; 32], 10));
        log.emit(distributed([4u8; 32], 5));

        log.truncate(mark);
        assert_eq!(log.len(), 1);
        assert_eq!(log.filter_by_type(EventType::Distributed).len(), 1);

        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(!log.has_events());
    }
}
