use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// How a single baseline line was affected by one variant.
///
/// `Added` is special: it does not describe the line itself but marks that
/// the variant carries extra content right after it. The other three are
/// mutually exclusive verdicts on the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    /// The line is present unchanged in the variant.
    Same,
    /// The line was rewritten in place.
    Changed,
    /// The variant has new content following this line.
    Added,
    /// The line is missing from the variant.
    Removed,
}

impl Classification {
    /// All classifications in declaration order.
    pub const ALL: [Classification; 4] = [Self::Same, Self::Changed, Self::Added, Self::Removed];

    /// The upper-case name used in exports (`SAME`, `CHANGED`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Same => "SAME",
            Self::Changed => "CHANGED",
            Self::Added => "ADDED",
            Self::Removed => "REMOVED",
        }
    }

    /// Returns `true` for [`Classification::Same`].
    pub fn is_same(&self) -> bool {
        matches!(self, Self::Same)
    }

    /// Returns `true` for [`Classification::Added`].
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added)
    }

    /// Returns `true` if the line itself was touched (changed or removed).
    pub fn is_modified(&self) -> bool {
        matches!(self, Self::Changed | Self::Removed)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Classification {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| TypeError::UnknownClassification(s.to_string()))
    }
}
