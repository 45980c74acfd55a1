//! Report rows handed to an external renderer.
//!
//! Each non-empty slot becomes one or more rows. Content rows carry the
//! 1-based line number and the literal baseline line; an `ADDED` row always
//! follows the content row of its slot and carries neither.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use impact_types::{Classification, Label};

use crate::bucket::Bucket;
use crate::state::FileState;

/// How report rows are assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    /// De-duplicate each row's label list.
    pub collapse_duplicate_labels: bool,
    /// Fold `REMOVED` labels into the `CHANGED` row.
    pub removed_as_changed: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            collapse_duplicate_labels: true,
            removed_as_changed: false,
        }
    }
}

/// One row of a rendered report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// 1-based baseline line number; `None` for inserted content.
    pub line: Option<usize>,
    /// The baseline line verbatim; empty for inserted content.
    pub content: String,
    /// The verdict this row shows.
    pub classification: Classification,
    /// Sorted labels responsible; empty for `SAME` rows.
    pub labels: Vec<Label>,
}

/// Per-label change count, as shown in a parameter statistics table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelStat {
    pub label: Label,
    pub changes: usize,
}

/// Build report rows for a session.
pub fn build_rows(state: &FileState, baseline: &[String], options: &ReportOptions) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for (slot, bucket) in state.buckets() {
        if bucket.is_empty() {
            continue;
        }

        let line = slot.line().map(|i| i + 1);
        let content = slot
            .line()
            .and_then(|i| baseline.get(i))
            .cloned()
            .unwrap_or_default();
        let content_row = |classification, labels| ReportRow {
            line,
            content: content.clone(),
            classification,
            labels,
        };

        let mut emitted = false;
        if options.removed_as_changed {
            let modified = sorted_labels(bucket, |c| c.is_modified(), options);
            if !modified.is_empty() {
                rows.push(content_row(Classification::Changed, modified));
                emitted = true;
            }
        } else {
            for target in [Classification::Changed, Classification::Removed] {
                let labels = sorted_labels(bucket, |c| c == target, options);
                if !labels.is_empty() {
                    rows.push(content_row(target, labels));
                    emitted = true;
                }
            }
        }

        if !emitted && bucket.has(Classification::Same) {
            rows.push(content_row(Classification::Same, Vec::new()));
        }

        let added = sorted_labels(bucket, |c| c.is_added(), options);
        if !added.is_empty() {
            rows.push(ReportRow {
                line: None,
                content: String::new(),
                classification: Classification::Added,
                labels: added,
            });
        }
    }

    rows
}

fn sorted_labels<F>(bucket: &Bucket, pred: F, options: &ReportOptions) -> Vec<Label>
where
    F: Fn(Classification) -> bool,
{
    let mut labels = bucket.labels_where(pred);
    labels.sort();
    if options.collapse_duplicate_labels {
        labels.dedup();
    }
    labels
}

/// Change counts for every label, most impactful first, ties by label.
pub fn label_stats(state: &FileState) -> Vec<LabelStat> {
    let mut stats: Vec<LabelStat> = state
        .labels()
        .iter()
        .map(|label| LabelStat {
            label: label.clone(),
            changes: state.count_changes(label.as_str()),
        })
        .collect();
    stats.sort_by(|a, b| (Reverse(a.changes), &a.label).cmp(&(Reverse(b.changes), &b.label)));
    stats
}
