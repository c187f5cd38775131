//! Per-run counters

use std::collections::BTreeMap;

use serde::Serialize;

use super::batch::OperationKind;
use super::reject::Rejections;

/// Counters for one operation kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    /// Rows removed, added or updated
    pub applied: usize,
    pub rejected: usize,
    /// Blank-key removal rows and removals of ids that were not present
    pub skipped: usize,
}

/// Outcome counts of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub kinds: BTreeMap<OperationKind, KindCounts>,
    /// Certifications deleted because their employee or skill was removed
    pub certifications_cascaded: usize,
    /// Certifications overwritten by a newer record for the same pair
    pub certifications_replaced: usize,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self, kind: OperationKind) -> KindCounts {
        self.kinds.get(&kind).copied().unwrap_or_default()
    }

    pub fn record_applied(&mut self, kind: OperationKind, n: usize) {
        self.kinds.entry(kind).or_default().applied += n;
    }

    pub fn record_skipped(&mut self, kind: OperationKind, n: usize) {
        if n > 0 {
            self.kinds.entry(kind).or_default().skipped += n;
        }
    }

    /// Fold another stage's counters into this one
    pub fn merge(&mut self, other: RunSummary) {
        for (kind, counts) in other.kinds {
            let entry = self.kinds.entry(kind).or_default();
            entry.applied += counts.applied;
            entry.rejected += counts.rejected;
            entry.skipped += counts.skipped;
        }
        self.certifications_cascaded += other.certifications_cascaded;
        self.certifications_replaced += other.certifications_replaced;
    }

    /// Set rejected counts from the final rejection list
    pub fn tally_rejections(&mut self, rejections: &Rejections) {
        for counts in self.kinds.values_mut() {
            counts.rejected = 0;
        }
        for record in rejections.iter() {
            self.kinds.entry(record.operation).or_default().rejected += 1;
        }
    }

    pub fn total_applied(&self) -> usize {
        self.kinds.values().map(|c| c.applied).sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.kinds.values().map(|c| c.rejected).sum()
    }
}

/// Past-tense verb for an operation kind, for summaries
pub fn applied_verb(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::RemoveTeam | OperationKind::RemoveEmployee | OperationKind::RemoveSkill => {
            "removed"
        }
        OperationKind::UpdateTeam => "updated",
        OperationKind::AddTrainingMap => "added/updated",
        OperationKind::AddTeam | OperationKind::AddEmployee | OperationKind::AddSkill => "added",
    }
}
