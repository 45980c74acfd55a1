//! Diff source adapters for the line-impact engine.
//!
//! Every way of describing how a variant differs from the baseline ends up
//! as one canonical [`EditScript`]: a list of zero-context [`Hunk`]s.
//!
//! # Key Types
//!
//! - [`DiffSource`] / [`LineDiffer`] -- Compute an edit script from two line sequences
//! - [`EditScript`] / [`Hunk`] / [`HunkShape`] -- The canonical hunk stream
//! - [`parse_unified`] / [`render_unified`] -- Zero-context unified diff text
//! - [`parse_markers`] -- `ndiff`-style marker streams

pub mod error;
pub mod hunk;
pub mod marker;
pub mod source;
pub mod unified;

pub use error::{DiffError, DiffResult};
pub use hunk::{EditScript, Hunk, HunkShape};
pub use marker::{marker_classification, parse_markers};
pub use source::{coalesce_ops, diff_lines, diff_lines_with, split_lines, DiffAlgorithm, DiffSource, LineDiffer};
pub use unified::{parse_unified, render_unified};
