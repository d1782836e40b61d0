//! Trial history: an ordered, newest-first sequence of immutable records.
//!
//! Mutation is limited to append (on analyze), replace-at-index (on edit)
//! and remove-at-index with a one-level undo. Every model in this crate is
//! recomputed from the full history, so there is no derived state to keep
//! in sync here.

use crate::grinder::GrinderState;
use crate::types::{BrewParams, Defects, Positives, PrepFlags};

/// One logged trial. Edits replace the whole record.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    /// ISO-8601 timestamp as supplied by the caller; the core never reads
    /// the clock.
    pub timestamp: String,
    pub params: BrewParams,
    pub grinder: GrinderState,
    pub defects: Defects,
    pub positives: Positives,
    pub extras: PrepFlags,
    pub use_measured_tds: bool,
    /// Extraction yield (%), authoritative only when `use_measured_tds`.
    pub ey: Option<f64>,
    /// Measured TDS (%), authoritative only when `use_measured_tds`.
    pub tds: Option<f64>,
    /// Rendered principal suggestion captured when the record was created.
    pub result: Option<String>,
}

impl TrialRecord {
    /// Recompute the stored EY from the measured TDS, or clear both when
    /// the refractometer flag is off. Called after an edit so stale
    /// derived values never survive a parameter change.
    pub fn refresh_measured(&mut self) {
        if self.use_measured_tds {
            self.ey = match (self.params.tds, self.params.ratio()) {
                (Some(tds), Some(_)) if tds > 0.0 => {
                    Some(tds * self.params.beverage_mass / self.params.dose_coffee)
                }
                _ => None,
            };
            self.tds = self.params.tds;
        } else {
            self.ey = None;
            self.tds = None;
        }
    }
}

/// Newest-first trial history with one-level delete undo.
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<TrialRecord>,
    undo: Option<(TrialRecord, usize)>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records already in newest-first order.
    pub fn from_records(entries: Vec<TrialRecord>) -> Self {
        Self {
            entries,
            undo: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrialRecord> {
        self.entries.get(index)
    }

    /// Newest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &TrialRecord> {
        self.entries.iter()
    }

    /// Append a new trial at the front (newest-first order).
    pub fn record(&mut self, record: TrialRecord) {
        self.entries.insert(0, record);
    }

    /// Replace the record at `index`, refreshing its derived values.
    /// Returns false when the index is out of bounds.
    pub fn replace(&mut self, index: usize, mut record: TrialRecord) -> bool {
        let Some(slot) = self.entries.get_mut(index) else {
            return false;
        };
        record.refresh_measured();
        *slot = record;
        true
    }

    /// Remove the record at `index`, keeping it for a single undo.
    /// Returns false when the index is out of bounds.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        let removed = self.entries.remove(index);
        self.undo = Some((removed, index));
        true
    }

    /// Restore the most recently removed record at its original index
    /// (clamped to the current length). Returns false when there is
    /// nothing to undo.
    pub fn undo_remove(&mut self) -> bool {
        let Some((record, index)) = self.undo.take() else {
            return false;
        };
        let at = index.min(self.entries.len());
        self.entries.insert(at, record);
        true
    }
}
