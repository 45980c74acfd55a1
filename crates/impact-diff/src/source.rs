//! Diff sources: turn (baseline, variant) line sequences into hunks.
//!
//! The default source, [`LineDiffer`], runs the `similar` crate over whole
//! lines (terminators included) and coalesces each run of non-equal
//! operations into one zero-context [`Hunk`]. Neighbouring hunks are thus
//! always separated by at least one common line.

use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffOp, DiffTag, TextDiff};

use crate::error::DiffResult;
use crate::hunk::{EditScript, Hunk};

/// Anything that can produce an edit script for a baseline and a variant.
///
/// Implementations must cover the entire baseline with no windowing and
/// emit hunks in increasing baseline order.
pub trait DiffSource: Send + Sync {
    /// Compute the edit script turning `baseline` into `variant`.
    fn edit_script(&self, baseline: &[&str], variant: &[&str]) -> DiffResult<EditScript>;
}

/// Line diff algorithm used by [`LineDiffer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// Myers' O(ND) algorithm.
    #[default]
    Myers,
    /// Patience diff.
    Patience,
    /// Classic longest-common-subsequence.
    Lcs,
}

impl From<DiffAlgorithm> for Algorithm {
    fn from(algorithm: DiffAlgorithm) -> Self {
        match algorithm {
            DiffAlgorithm::Myers => Algorithm::Myers,
            DiffAlgorithm::Patience => Algorithm::Patience,
            DiffAlgorithm::Lcs => Algorithm::Lcs,
        }
    }
}

/// [`DiffSource`] backed by `similar`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineDiffer {
    algorithm: DiffAlgorithm,
}

impl LineDiffer {
    /// Create a differ using the given algorithm.
    pub fn new(algorithm: DiffAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl DiffSource for LineDiffer {
    fn edit_script(&self, baseline: &[&str], variant: &[&str]) -> DiffResult<EditScript> {
        Ok(diff_lines_with(self.algorithm, baseline, variant))
    }
}

/// Compute the edit script between two line sequences with Myers' algorithm.
pub fn diff_lines(baseline: &[&str], variant: &[&str]) -> EditScript {
    diff_lines_with(DiffAlgorithm::Myers, baseline, variant)
}

/// Compute the edit script between two line sequences.
pub fn diff_lines_with(algorithm: DiffAlgorithm, baseline: &[&str], variant: &[&str]) -> EditScript {
    if baseline == variant {
        return EditScript::new(baseline.len(), variant.len(), Vec::new());
    }

    let text_diff = TextDiff::configure()
        .algorithm(algorithm.into())
        .diff_slices(baseline, variant);

    EditScript::new(baseline.len(), variant.len(), coalesce_ops(text_diff.ops()))
}

/// Merge every run of consecutive non-equal diff operations into one hunk.
pub fn coalesce_ops(ops: &[DiffOp]) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut pending: Option<Hunk> = None;

    for op in ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            hunks.extend(pending.take());
            continue;
        }
        match pending.as_mut() {
            Some(hunk) => {
                hunk.old_len += old_range.len();
                hunk.new_len += new_range.len();
            }
            None => {
                pending = Some(Hunk::new(
                    old_range.start,
                    old_range.len(),
                    new_range.start,
                    new_range.len(),
                ));
            }
        }
    }
    hunks.extend(pending);

    hunks
}

/// Split text into lines, keeping each line's terminator.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}
