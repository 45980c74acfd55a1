//! The reconciler: one variant's hunk stream in, per-slot verdicts out.
//!
//! Hunks are consumed in baseline order. For a hunk covering baseline
//! `[s, s+d)` and variant `[t, t+a)`:
//!
//! | shape | verdict |
//! |---|---|
//! | `d == 0` | one `ADDED` on slot `s-1` (the sentinel when `s == 0`) |
//! | `d == a` | `[s, s+d)` `CHANGED` |
//! | `d > a` | `[s, s+a)` `CHANGED`, `[s+a, s+d)` `REMOVED` |
//! | `d < a` | `[s, s+d)` `CHANGED`, one `ADDED` on `s+d-1` |
//!
//! Every baseline slot no hunk touches is `SAME`; gaps between hunks and the
//! tail after the last hunk are backfilled before moving on.
//!
//! # Invariants
//!
//! - Slots are emitted in non-decreasing order.
//! - Per slot, at most one of `SAME`/`CHANGED`/`REMOVED` and at most one
//!   `ADDED`, the latter after the former.
//! - Common runs between hunks have the same length on both sides, and the
//!   hunks account for exactly the declared variant length.

use std::ops::Range;

use impact_diff::{DiffError, EditScript, Hunk, HunkShape};
use impact_types::{Classification, Slot};

use crate::error::{EngineError, EngineResult, OrderingKind};

/// A single verdict produced by the reconciler.
pub type Assignment = (Slot, Classification);

/// Streaming state for one reconciliation pass.
///
/// Assignments are buffered until [`Reconciler::finish`]; nothing reaches a
/// session unless the whole stream reconciled.
#[derive(Debug)]
pub struct Reconciler {
    baseline_len: usize,
    variant_len: usize,
    /// Next baseline slot not yet given a verdict.
    cursor: usize,
    /// Variant index matching `cursor`.
    new_cursor: usize,
    last: Option<Slot>,
    /// The last slot already holds a SAME/CHANGED/REMOVED verdict.
    placed: bool,
    /// The last slot already holds an ADDED verdict.
    added: bool,
    pending: Vec<Assignment>,
}

impl Reconciler {
    /// Start a pass over a baseline of `baseline_len` lines against a
    /// variant of `variant_len` lines.
    pub fn new(baseline_len: usize, variant_len: usize) -> Self {
        Self {
            baseline_len,
            variant_len,
            cursor: 0,
            new_cursor: 0,
            last: None,
            placed: false,
            added: false,
            pending: Vec::with_capacity(baseline_len + 1),
        }
    }

    /// Reconcile a whole edit script against a baseline of `baseline_len`
    /// lines.
    pub fn reconcile(baseline_len: usize, script: &EditScript) -> EngineResult<Vec<Assignment>> {
        if script.old_len != baseline_len {
            return Err(DiffError::BaselineMismatch {
                expected: baseline_len,
                actual: script.old_len,
            }
            .into());
        }

        let mut reconciler = Self::new(baseline_len, script.new_len);
        for hunk in &script.hunks {
            reconciler.apply(hunk)?;
        }
        reconciler.finish()
    }

    /// Consume the next hunk.
    pub fn apply(&mut self, hunk: &Hunk) -> EngineResult<()> {
        let shape = hunk.shape()?;
        let covered = hunk.check_bounds(self.baseline_len, self.variant_len)?;

        if hunk.old_start < self.cursor {
            return Err(EngineError::OrderingViolation {
                slot: Slot::Line(hunk.old_start),
                last: Slot::Line(self.cursor - 1),
                kind: OrderingKind::Regressed,
            });
        }

        // Lines between hunks are common, so both sides skip the same count.
        let expected = self.new_cursor.checked_add(hunk.old_start - self.cursor);
        if expected != Some(hunk.new_start) {
            return Err(DiffError::Misaligned {
                old_start: hunk.old_start,
                new_start: hunk.new_start,
                expected: expected.unwrap_or(usize::MAX),
            }
            .into());
        }

        self.fill(self.cursor..covered.start, Classification::Same)?;

        let Range { start, end } = covered;
        match shape {
            HunkShape::Insertion => {
                self.emit(Slot::before(start), Classification::Added)?;
            }
            HunkShape::Replace => {
                self.fill(start..end, Classification::Changed)?;
            }
            HunkShape::NetRemoval => {
                let aligned = start + hunk.new_len;
                self.fill(start..aligned, Classification::Changed)?;
                self.fill(aligned..end, Classification::Removed)?;
            }
            HunkShape::NetInsertion => {
                self.fill(start..end, Classification::Changed)?;
                self.emit(Slot::before(end), Classification::Added)?;
            }
        }

        self.cursor = end;
        // In bounds: check_bounds passed.
        self.new_cursor = hunk.new_start + hunk.new_len;
        Ok(())
    }

    /// Backfill the remaining slots as `SAME` and hand out the assignments.
    pub fn finish(mut self) -> EngineResult<Vec<Assignment>> {
        let expected = self.new_cursor.checked_add(self.baseline_len - self.cursor);
        if expected != Some(self.variant_len) {
            return Err(DiffError::VariantLengthMismatch {
                expected: expected.unwrap_or(usize::MAX),
                actual: self.variant_len,
            }
            .into());
        }

        self.fill(self.cursor..self.baseline_len, Classification::Same)?;
        Ok(self.pending)
    }

    fn fill(&mut self, range: Range<usize>, classification: Classification) -> EngineResult<()> {
        for index in range {
            self.emit(Slot::Line(index), classification)?;
        }
        Ok(())
    }

    fn emit(&mut self, slot: Slot, classification: Classification) -> EngineResult<()> {
        match self.last {
            Some(last) if slot < last => {
                return Err(EngineError::OrderingViolation {
                    slot,
                    last,
                    kind: OrderingKind::Regressed,
                });
            }
            Some(last) if slot == last => {}
            _ => {
                self.placed = false;
                self.added = false;
            }
        }

        let violation = if classification.is_added() {
            self.added.then_some(OrderingKind::Repeated)
        } else if self.added {
            // Line content must come before what is inserted after it.
            Some(OrderingKind::Regressed)
        } else {
            self.placed.then_some(OrderingKind::Repeated)
        };
        if let Some(kind) = violation {
            return Err(EngineError::OrderingViolation {
                slot,
                last: slot,
                kind,
            });
        }

        if classification.is_added() {
            self.added = true;
        } else {
            self.placed = true;
        }
        self.last = Some(slot);
        self.pending.push((slot, classification));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use Classification::{Added, Changed, Removed, Same};

    fn run(baseline_len: usize, new_len: usize, hunks: Vec<Hunk>) -> EngineResult<Vec<Assignment>> {
        Reconciler::reconcile(baseline_len, &EditScript::new(baseline_len, new_len, hunks))
    }

    #[test]
    fn no_hunks_is_all_same() {
        let out = run(3, 3, vec![]).unwrap();
        assert_eq!(
            out,
            vec![(Slot::Line(0), Same), (Slot::Line(1), Same), (Slot::Line(2), Same)]
        );
    }

    #[test]
    fn empty_baseline_with_no_hunks() {
        assert!(run(0, 0, vec![]).unwrap().is_empty());
    }

    #[test]
    fn leading_insertion_goes_to_sentinel() {
        let out = run(1, 2, vec![Hunk::new(0, 0, 0, 1)]).unwrap();
        assert_eq!(out, vec![(Slot::Sentinel, Added), (Slot::Line(0), Same)]);
    }

    #[test]
    fn insertion_follows_same_on_previous_line() {
        let out = run(2, 3, vec![Hunk::new(1, 0, 1, 1)]).unwrap();
        assert_eq!(
            out,
            vec![(Slot::Line(0), Same), (Slot::Line(0), Added), (Slot::Line(1), Same)]
        );
    }

    #[test]
    fn trailing_insertion() {
        let out = run(2, 3, vec![Hunk::new(2, 0, 2, 1)]).unwrap();
        assert_eq!(
            out,
            vec![(Slot::Line(0), Same), (Slot::Line(1), Same), (Slot::Line(1), Added)]
        );
    }

    #[test]
    fn equal_length_replace() {
        let out = run(4, 4, vec![Hunk::new(1, 2, 1, 2)]).unwrap();
        assert_eq!(
            out,
            vec![
                (Slot::Line(0), Same),
                (Slot::Line(1), Changed),
                (Slot::Line(2), Changed),
                (Slot::Line(3), Same),
            ]
        );
    }

    #[test]
    fn net_removal_changes_prefix_and_removes_rest() {
        let out = run(6, 4, vec![Hunk::new(1, 4, 1, 2)]).unwrap();
        assert_eq!(
            out,
            vec![
                (Slot::Line(0), Same),
                (Slot::Line(1), Changed),
                (Slot::Line(2), Changed),
                (Slot::Line(3), Removed),
                (Slot::Line(4), Removed),
                (Slot::Line(5), Same),
            ]
        );
    }

    #[test]
    fn pure_removal() {
        let out = run(3, 2, vec![Hunk::new(0, 1, 0, 0)]).unwrap();
        assert_eq!(
            out,
            vec![(Slot::Line(0), Removed), (Slot::Line(1), Same), (Slot::Line(2), Same)]
        );
    }

    #[test]
    fn net_insertion_adds_after_last_changed_line() {
        let out = run(3, 4, vec![Hunk::new(1, 1, 1, 2)]).unwrap();
        assert_eq!(
            out,
            vec![
                (Slot::Line(0), Same),
                (Slot::Line(1), Changed),
                (Slot::Line(1), Added),
                (Slot::Line(2), Same),
            ]
        );
    }

    #[test]
    fn adjacent_insertion_and_removal() {
        // "+ x" then "- b" in a marker stream.
        let out = run(3, 3, vec![Hunk::new(1, 0, 1, 1), Hunk::new(1, 1, 2, 0)]).unwrap();
        assert_eq!(
            out,
            vec![
                (Slot::Line(0), Same),
                (Slot::Line(0), Added),
                (Slot::Line(1), Removed),
                (Slot::Line(2), Same),
            ]
        );
    }

    #[test]
    fn multiple_hunks_backfill_gaps() {
        let out = run(5, 5, vec![Hunk::new(0, 1, 0, 1), Hunk::new(3, 1, 3, 1)]).unwrap();
        let classes: Vec<_> = out.iter().map(|(_, c)| *c).collect();
        assert_eq!(classes, vec![Changed, Same, Same, Changed, Same]);
    }

    #[test]
    fn empty_hunk_is_diff_source_error() {
        let err = run(2, 2, vec![Hunk::new(1, 0, 1, 0)]).unwrap_err();
        assert_eq!(err, EngineError::DiffSource(DiffError::EmptyHunk { old_start: 1 }));
    }

    #[test]
    fn out_of_range_hunk_is_diff_source_error() {
        let err = run(2, 2, vec![Hunk::new(1, 2, 1, 1)]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::DiffSource(DiffError::HunkOutOfRange { side: "baseline", .. })
        ));
    }

    #[test]
    fn baseline_mismatch_is_diff_source_error() {
        let script = EditScript::new(5, 5, vec![]);
        let err = Reconciler::reconcile(4, &script).unwrap_err();
        assert_eq!(
            err,
            EngineError::DiffSource(DiffError::BaselineMismatch {
                expected: 4,
                actual: 5
            })
        );
    }

    #[test]
    fn regressing_hunk_is_ordering_violation() {
        let err = run(5, 5, vec![Hunk::new(3, 1, 3, 1), Hunk::new(1, 1, 1, 1)]).unwrap_err();
        assert_eq!(
            err,
            EngineError::OrderingViolation {
                slot: Slot::Line(1),
                last: Slot::Line(3),
                kind: OrderingKind::Regressed,
            }
        );
    }

    #[test]
    fn overlapping_hunk_is_ordering_violation() {
        let err = run(5, 5, vec![Hunk::new(1, 2, 1, 2), Hunk::new(2, 1, 3, 1)]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OrderingViolation {
                kind: OrderingKind::Regressed,
                ..
            }
        ));
    }

    #[test]
    fn repeated_insertion_is_ordering_violation() {
        let err = run(2, 4, vec![Hunk::new(1, 0, 1, 1), Hunk::new(1, 0, 2, 1)]).unwrap_err();
        assert_eq!(
            err,
            EngineError::OrderingViolation {
                slot: Slot::Line(0),
                last: Slot::Line(0),
                kind: OrderingKind::Repeated,
            }
        );
    }

    #[test]
    fn repeated_sentinel_insertion_is_ordering_violation() {
        let err = run(1, 3, vec![Hunk::new(0, 0, 0, 1), Hunk::new(0, 0, 1, 1)]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OrderingViolation {
                slot: Slot::Sentinel,
                kind: OrderingKind::Repeated,
                ..
            }
        ));
    }

    #[test]
    fn insertion_after_net_insertion_on_same_slot_is_repeated() {
        let err = run(3, 6, vec![Hunk::new(0, 1, 0, 2), Hunk::new(1, 0, 2, 1)]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OrderingViolation {
                kind: OrderingKind::Repeated,
                ..
            }
        ));
    }

    #[test]
    fn overflowing_hunks_are_diff_source_errors() {
        let cases = [
            (Hunk::new(usize::MAX - 1, 2, 0, 1), "baseline"),
            (Hunk::new(0, usize::MAX, 0, 1), "baseline"),
            (Hunk::new(0, 1, usize::MAX - 1, 2), "variant"),
            (Hunk::new(0, 1, 0, usize::MAX), "variant"),
        ];
        for (hunk, expected_side) in cases {
            let mut reconciler = Reconciler::new(2, 2);
            match reconciler.apply(&hunk) {
                Err(EngineError::DiffSource(DiffError::HunkOutOfRange { side, .. })) => {
                    assert_eq!(side, expected_side, "{hunk:?}");
                }
                other => panic!("expected out-of-range for {hunk:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn misaligned_variant_start_is_diff_source_error() {
        // One common line before the hunk on the baseline side, none on the variant side.
        let err = run(3, 3, vec![Hunk::new(1, 1, 0, 1)]).unwrap_err();
        assert_eq!(
            err,
            EngineError::DiffSource(DiffError::Misaligned {
                old_start: 1,
                new_start: 0,
                expected: 1,
            })
        );

        let overlapping = run(4, 4, vec![Hunk::new(0, 1, 0, 2), Hunk::new(2, 1, 1, 1)]).unwrap_err();
        assert!(matches!(
            overlapping,
            EngineError::DiffSource(DiffError::Misaligned { expected: 3, .. })
        ));
    }

    #[test]
    fn wrong_variant_length_is_diff_source_error() {
        let err = run(3, 5, vec![Hunk::new(1, 1, 1, 1)]).unwrap_err();
        assert_eq!(
            err,
            EngineError::DiffSource(DiffError::VariantLengthMismatch {
                expected: 3,
                actual: 5,
            })
        );
    }

    #[test]
    fn streaming_api_matches_reconcile() {
        let mut reconciler = Reconciler::new(3, 3);
        reconciler.apply(&Hunk::new(1, 1, 1, 1)).unwrap();
        let out = reconciler.finish().unwrap();
        assert_eq!(out, run(3, 3, vec![Hunk::new(1, 1, 1, 1)]).unwrap());
    }
}
