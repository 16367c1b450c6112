//! Journal - port events and running counters for hosts and tests
//!
//! The controller records what happens to each ship here. Hosts drain the
//! journal periodically; if they never do, only the most recent entries are
//! kept.

use crate::components::CargoState;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Entries kept when the host does not drain the journal
pub const JOURNAL_CAPACITY: usize = 4096;

/// Something that happened in the port. Ships are named by arrival serial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortEvent {
    Arrived { ship: u32, cargo: CargoState },
    Docked { ship: u32, dock: usize },
    Queued { ship: u32, cargo: CargoState, slot: usize },
    Promoted { ship: u32, dock: usize },
    CargoExchanged { ship: u32, dock: usize, cargo: CargoState },
    DockReopened { dock: usize },
    GateClosed,
    GateOpened,
    InboundPaused { ship: u32 },
    InboundResumed { ship: u32 },
    Departed { ship: u32 },
    Removed { ship: u32, stranded_dock: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortEventRecord {
    pub at_ms: f64,
    pub event: PortEvent,
}

/// Running totals since the port was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortStats {
    pub arrived: u64,
    pub docked: u64,
    pub queued: u64,
    pub promoted: u64,
    pub exchanges: u64,
    pub departed: u64,
    pub removed: u64,
    pub gate_pauses: u64,
    pub gate_resumes: u64,
}

impl PortStats {
    /// Ships that arrived and have not left by any route
    pub fn in_port(&self) -> u64 {
        self.arrived - self.departed - self.removed
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    records: VecDeque<PortEventRecord>,
    stats: PortStats,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and bump the matching counter
    pub fn record(&mut self, at_ms: f64, event: PortEvent) {
        match &event {
            PortEvent::Arrived { .. } => self.stats.arrived += 1,
            PortEvent::Docked { .. } => self.stats.docked += 1,
            PortEvent::Queued { .. } => self.stats.queued += 1,
            PortEvent::Promoted { .. } => self.stats.promoted += 1,
            PortEvent::CargoExchanged { .. } => self.stats.exchanges += 1,
            PortEvent::Departed { .. } => self.stats.departed += 1,
            PortEvent::Removed { .. } => self.stats.removed += 1,
            PortEvent::InboundPaused { .. } => self.stats.gate_pauses += 1,
            PortEvent::InboundResumed { .. } => self.stats.gate_resumes += 1,
            PortEvent::DockReopened { .. } | PortEvent::GateClosed | PortEvent::GateOpened => {}
        }

        if self.records.len() == JOURNAL_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(PortEventRecord { at_ms, event });
    }

    pub fn stats(&self) -> PortStats {
        self.stats
    }

    pub fn records(&self) -> impl Iterator<Item = &PortEventRecord> {
        self.records.iter()
    }

    pub fn drain(&mut self) -> Vec<PortEventRecord> {
        self.records.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_follow_events() {
        let mut journal = EventJournal::new();
        journal.record(0.0, PortEvent::Arrived { ship: 1, cargo: CargoState::Empty });
        journal.record(1.0, PortEvent::Docked { ship: 1, dock: 0 });
        journal.record(2.0, PortEvent::Departed { ship: 1 });
        journal.record(3.0, PortEvent::GateClosed);

        let stats = journal.stats();
        assert_eq!(stats.arrived, 1);
        assert_eq!(stats.docked, 1);
        assert_eq!(stats.departed, 1);
        assert_eq!(stats.in_port(), 0);
        assert_eq!(journal.len(), 4);
    }

    #[test]
    fn test_drain_keeps_stats() {
        let mut journal = EventJournal::new();
        journal.record(0.0, PortEvent::Arrived { ship: 1, cargo: CargoState::Full });
        let drained = journal.drain();
        assert_eq!(drained.len(), 1);
        assert!(journal.is_empty());
        assert_eq!(journal.stats().arrived, 1);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut journal = EventJournal::new();
        for i in 0..(JOURNAL_CAPACITY as u32 + 5) {
            journal.record(i as f64, PortEvent::Departed { ship: i });
        }
        assert_eq!(journal.len(), JOURNAL_CAPACITY);
        assert_eq!(journal.records().next().map(|r| r.at_ms), Some(5.0));
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&PortEvent::Docked { ship: 3, dock: 1 }).unwrap();
        assert_eq!(json, r#"{"kind":"docked","ship":3,"dock":1}"#);
    }
}
