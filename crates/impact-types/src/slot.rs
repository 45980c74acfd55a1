//! Annotation slots: baseline line positions plus the leading sentinel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A position in the baseline where annotations accumulate.
///
/// Every baseline line `i` maps to `Slot::Line(i)`. `Slot::Sentinel` sits
/// before the first line and only ever collects insertions at the start of
/// the file. In signed form the sentinel is `-1`.
///
/// Ordering: `Sentinel` precedes every `Line`, lines compare by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Slot {
    /// Before the first baseline line (`-1`).
    Sentinel,
    /// A zero-based baseline line index.
    Line(usize),
}

impl Slot {
    /// The slot that new content inserted *before* baseline index `index`
    /// attaches to: the preceding line, or the sentinel at the file start.
    pub fn before(index: usize) -> Self {
        match index.checked_sub(1) {
            Some(prev) => Self::Line(prev),
            None => Self::Sentinel,
        }
    }

    /// Signed index form: `-1` for the sentinel, the line index otherwise.
    pub fn index(&self) -> i64 {
        match self {
            Self::Sentinel => -1,
            Self::Line(i) => *i as i64,
        }
    }

    /// Inverse of [`Slot::index`]. Returns `None` below `-1`.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            -1 => Some(Self::Sentinel),
            i if i >= 0 => usize::try_from(i).ok().map(Self::Line),
            _ => None,
        }
    }

    /// The baseline line index, if this is not the sentinel.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Sentinel => None,
            Self::Line(i) => Some(*i),
        }
    }
}

impl TryFrom<i64> for Slot {
    type Error = TypeError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(TypeError::InvalidSlot(index))
    }
}

impl From<Slot> for i64 {
    fn from(slot: Slot) -> Self {
        slot.index()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}
