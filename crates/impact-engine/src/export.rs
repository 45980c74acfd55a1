//! Raw session export: slot → `(label, classification)` list.
//!
//! This is the contract handed to report renderers. Slots are ordered with
//! the sentinel (`-1`) first, then `0..N-1`. In JSON the slot keys are
//! written as strings (`"-1"`, `"0"`, ...) and each entry as a two-element
//! array `["label", "CLASSIFICATION"]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use impact_types::{Classification, Label, Slot};

use crate::error::{EngineError, EngineResult};

/// One exported annotation.
pub type RawEntry = (Label, Classification);

/// An owned snapshot of a session's buckets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawExport {
    slots: BTreeMap<Slot, Vec<RawEntry>>,
}

impl RawExport {
    /// Number of slots, sentinel included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the export holds no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Entries recorded at `slot`.
    pub fn get(&self, slot: Slot) -> Option<&[RawEntry]> {
        self.slots.get(&slot).map(Vec::as_slice)
    }

    /// Entries at `slot` as `(label, classification-name)` string pairs.
    ///
    /// Missing slots yield an empty list.
    pub fn names(&self, slot: Slot) -> Vec<(&str, &'static str)> {
        self.get(slot)
            .unwrap_or_default()
            .iter()
            .map(|(label, class)| (label.as_str(), class.name()))
            .collect()
    }

    /// Iterate in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &[RawEntry])> + '_ {
        self.slots.iter().map(|(slot, entries)| (*slot, entries.as_slice()))
    }

    /// Slots holding at least one non-`SAME` entry.
    pub fn changed_slots(&self) -> usize {
        self.slots
            .values()
            .filter(|entries| entries.iter().any(|(_, c)| !c.is_same()))
            .count()
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> EngineResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    /// Deserialize from JSON produced by [`RawExport::to_json`].
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Serialization(e.to_string()))
    }
}

impl FromIterator<(Slot, Vec<RawEntry>)> for RawExport {
    fn from_iter<I: IntoIterator<Item = (Slot, Vec<RawEntry>)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}
