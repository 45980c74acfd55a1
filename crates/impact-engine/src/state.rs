//! Session state: every bucket of one baseline, fed one variant at a time.
//!
//! [`FileState`] owns the sentinel bucket plus one bucket per baseline line.
//! Adding a variant runs the [`Reconciler`] to completion first and only
//! then commits, so a rejected variant leaves the state untouched.

use tracing::{debug, warn};

use impact_diff::{DiffError, EditScript};
use impact_types::{Label, Slot};

use crate::bucket::Bucket;
use crate::error::EngineResult;
use crate::export::RawExport;
use crate::reconcile::{Assignment, Reconciler};

/// All annotation buckets for one baseline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileState {
    /// Sentinel bucket: insertions before the first line.
    before: Bucket,
    /// One bucket per baseline line.
    lines: Vec<Bucket>,
    /// Distinct labels in order of first addition.
    labels: Vec<Label>,
}

impl FileState {
    /// Create empty state for a baseline of `len` lines.
    pub fn new(len: usize) -> Self {
        Self {
            before: Bucket::new(),
            lines: vec![Bucket::new(); len],
            labels: Vec::new(),
        }
    }

    /// Number of baseline lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the baseline has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Labels added so far, in order of first addition.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The bucket at `slot`, if the slot exists.
    pub fn bucket(&self, slot: Slot) -> Option<&Bucket> {
        match slot {
            Slot::Sentinel => Some(&self.before),
            Slot::Line(i) => self.lines.get(i),
        }
    }

    /// All buckets, sentinel first.
    pub fn buckets(&self) -> impl Iterator<Item = (Slot, &Bucket)> + '_ {
        std::iter::once((Slot::Sentinel, &self.before))
            .chain(self.lines.iter().enumerate().map(|(i, b)| (Slot::Line(i), b)))
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Reconcile one variant's edit script and commit its annotations.
    ///
    /// Returns `true` if the variant produced any non-`SAME` annotation.
    /// On error nothing is committed.
    pub fn add_variant(&mut self, label: impl Into<Label>, script: &EditScript) -> EngineResult<bool> {
        let label = label.into();

        let changed = match Reconciler::reconcile(self.len(), script)
            .and_then(|assignments| self.commit(&label, assignments))
        {
            Ok(changed) => changed,
            Err(e) => {
                warn!(label = %label, error = %e, "variant rejected");
                return Err(e);
            }
        };

        debug!(label = %label, hunks = script.len(), changed, "variant reconciled");
        Ok(changed)
    }

    /// Append one variant's assignments, all or none.
    fn commit(&mut self, label: &Label, assignments: Vec<Assignment>) -> EngineResult<bool> {
        let len = self.len();
        if let Some(index) = assignments
            .iter()
            .filter_map(|(slot, _)| slot.line())
            .find(|&index| index >= len)
        {
            return Err(DiffError::HunkOutOfRange {
                side: "baseline",
                start: index,
                end: index.saturating_add(1),
                len,
            }
            .into());
        }

        let changed = assignments.iter().any(|(_, c)| !c.is_same());
        for (slot, classification) in assignments {
            let bucket = match slot {
                Slot::Sentinel => &mut self.before,
                Slot::Line(index) => &mut self.lines[index],
            };
            bucket.push(label.clone(), classification);
        }
        if !self.labels.contains(label) {
            self.labels.push(label.clone());
        }
        Ok(changed)
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Distinct non-`SAME` classifications attributed to `label`, summed
    /// over all slots.
    pub fn count_changes(&self, label: &str) -> usize {
        self.buckets()
            .map(|(_, bucket)| bucket.count_changes(Some(label)))
            .sum()
    }

    /// Number of slots holding at least one non-`SAME` annotation.
    pub fn count_changed_lines(&self) -> usize {
        self.buckets().filter(|(_, bucket)| bucket.has_change()).count()
    }

    /// Snapshot of every bucket as `(label, classification)` pairs.
    pub fn export_raw(&self) -> RawExport {
        self.buckets()
            .map(|(slot, bucket)| {
                let entries = bucket
                    .iter()
                    .map(|a| (a.label.clone(), a.classification))
                    .collect();
                (slot, entries)
            })
            .collect()
    }
}
