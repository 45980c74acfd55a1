//! Per-slot annotation lists.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use impact_types::{Annotation, Classification, Label};

/// The ordered annotations collected at one slot across all variants.
///
/// Buckets only grow: annotations are appended in the order variants were
/// added and never rewritten.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bucket {
    annotations: Vec<Annotation>,
}

impl Bucket {
    /// Create an empty bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no variant annotated this slot.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Number of annotations.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Iterate over the annotations.
    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.annotations.iter()
    }

    /// Append an annotation.
    pub fn push(&mut self, label: Label, classification: Classification) {
        self.annotations.push(Annotation::new(label, classification));
    }

    /// Returns `true` if any annotation has the given classification.
    pub fn has(&self, classification: Classification) -> bool {
        self.annotations
            .iter()
            .any(|a| a.classification == classification)
    }

    /// Returns `true` if any annotation is something other than `SAME`.
    pub fn has_change(&self) -> bool {
        self.annotations.iter().any(|a| !a.classification.is_same())
    }

    /// Number of distinct non-`SAME` classifications, optionally restricted
    /// to one label.
    pub fn count_changes(&self, label: Option<&str>) -> usize {
        self.annotations
            .iter()
            .filter(|a| label.map_or(true, |l| a.label == *l))
            .filter(|a| !a.classification.is_same())
            .map(|a| a.classification)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Labels of all annotations matching `pred`, in insertion order.
    pub fn labels_where<F>(&self, pred: F) -> Vec<Label>
    where
        F: Fn(Classification) -> bool,
    {
        self.annotations
            .iter()
            .filter(|a| pred(a.classification))
            .map(|a| a.label.clone())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Bucket {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.iter()
    }
}
