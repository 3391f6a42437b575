//! Announcement ledger: at-most-once bookkeeping per (item, transition).
//!
//! Records are created on first observation of an identity and flags are
//! never reset. Nothing is evicted; identities are assumed not to recur
//! within one process run.

use std::collections::HashMap;

use crate::ranker::Transition;

/// Per-identity announcement flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionRecord {
    pub starting: bool,
    pub expiring: bool,
    pub starting_soon: bool,
}

impl TransitionRecord {
    pub fn is_announced(&self, transition: Transition) -> bool {
        match transition {
            Transition::Starting => self.starting,
            Transition::Expiring => self.expiring,
            Transition::StartingSoon => self.starting_soon,
        }
    }

    fn mark(&mut self, transition: Transition) {
        match transition {
            Transition::Starting => self.starting = true,
            Transition::Expiring => self.expiring = true,
            Transition::StartingSoon => self.starting_soon = true,
        }
    }
}

/// Owned by the evaluation loop; the single writer.
#[derive(Debug, Default)]
pub struct AnnouncementLedger {
    records: HashMap<String, TransitionRecord>,
}

impl AnnouncementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `transition` has not yet been announced for `guid`.
    pub fn should_announce(&self, guid: &str, transition: Transition) -> bool {
        self.records
            .get(guid)
            .map_or(true, |r| !r.is_announced(transition))
    }

    /// Record that `transition` was announced for `guid`.
    pub fn mark_announced(&mut self, guid: &str, transition: Transition) {
        self.records.entry(guid.to_string()).or_default().mark(transition);
    }

    /// Check-and-mark in one step. Returns `true` exactly once per pair.
    pub fn claim(&mut self, guid: &str, transition: Transition) -> bool {
        let record = self.records.entry(guid.to_string()).or_default();
        if record.is_announced(transition) {
            return false;
        }
        record.mark(transition);
        true
    }

    pub fn record(&self, guid: &str) -> Option<&TransitionRecord> {
        self.records.get(guid)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
