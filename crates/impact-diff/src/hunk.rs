//! The canonical hunk stream exchanged between diff sources and the engine.
//!
//! A hunk is a zero-context difference block: `old_len` baseline lines
//! starting at `old_start` were replaced by `new_len` variant lines starting
//! at `new_start`. All indices are zero-based. For a pure insertion
//! (`old_len == 0`) `old_start` is the baseline index the new lines are
//! inserted *before*.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// A contiguous difference block between baseline and variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hunk {
    /// First baseline line covered (zero-based).
    pub old_start: usize,
    /// Number of baseline lines covered.
    pub old_len: usize,
    /// First variant line covered (zero-based).
    pub new_start: usize,
    /// Number of variant lines covered.
    pub new_len: usize,
}

/// The four hunk shapes the engine knows how to classify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HunkShape {
    /// `old_len == 0`: new lines only.
    Insertion,
    /// `old_len == new_len`: every covered line was rewritten.
    Replace,
    /// `old_len > new_len`: aligned prefix rewritten, the rest dropped.
    NetRemoval,
    /// `0 < old_len < new_len`: all covered lines rewritten, extra lines follow.
    NetInsertion,
}

impl Hunk {
    /// Create a hunk from zero-based ranges.
    pub fn new(old_start: usize, old_len: usize, new_start: usize, new_len: usize) -> Self {
        Self {
            old_start,
            old_len,
            new_start,
            new_len,
        }
    }

    /// One past the last baseline line covered, `None` on overflow.
    pub fn old_end(&self) -> Option<usize> {
        self.old_start.checked_add(self.old_len)
    }

    /// One past the last variant line covered, `None` on overflow.
    pub fn new_end(&self) -> Option<usize> {
        self.new_start.checked_add(self.new_len)
    }

    /// Returns `true` if the hunk neither removes nor inserts anything.
    pub fn is_empty(&self) -> bool {
        self.old_len == 0 && self.new_len == 0
    }

    /// Classify the hunk, rejecting the degenerate empty shape.
    pub fn shape(&self) -> DiffResult<HunkShape> {
        if self.is_empty() {
            return Err(DiffError::EmptyHunk {
                old_start: self.old_start,
            });
        }
        Ok(if self.old_len == 0 {
            HunkShape::Insertion
        } else if self.old_len == self.new_len {
            HunkShape::Replace
        } else if self.old_len > self.new_len {
            HunkShape::NetRemoval
        } else {
            HunkShape::NetInsertion
        })
    }

    /// Check that both ranges fit inside sequences of the given lengths and
    /// return the covered baseline range.
    pub fn check_bounds(&self, old_len: usize, new_len: usize) -> DiffResult<Range<usize>> {
        let old_end = self
            .old_end()
            .filter(|&end| end <= old_len)
            .ok_or_else(|| DiffError::HunkOutOfRange {
                side: "baseline",
                start: self.old_start,
                end: self.old_start.saturating_add(self.old_len),
                len: old_len,
            })?;
        self.new_end()
            .filter(|&end| end <= new_len)
            .ok_or_else(|| DiffError::HunkOutOfRange {
                side: "variant",
                start: self.new_start,
                end: self.new_start.saturating_add(self.new_len),
                len: new_len,
            })?;
        Ok(self.old_start..old_end)
    }
}

/// The full edit script of one variant against the baseline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    /// Number of baseline lines.
    pub old_len: usize,
    /// Number of variant lines.
    pub new_len: usize,
    /// Hunks in increasing `old_start` order.
    pub hunks: Vec<Hunk>,
}

impl EditScript {
    /// Create an edit script.
    pub fn new(old_len: usize, new_len: usize, hunks: Vec<Hunk>) -> Self {
        Self {
            old_len,
            new_len,
            hunks,
        }
    }

    /// Returns `true` if baseline and variant are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Number of hunks.
    pub fn len(&self) -> usize {
        self.hunks.len()
    }

    /// Total number of variant lines inserted across all hunks.
    pub fn additions(&self) -> usize {
        self.hunks.iter().map(|h| h.new_len).sum()
    }

    /// Total number of baseline lines replaced or dropped across all hunks.
    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(|h| h.old_len).sum()
    }
}
