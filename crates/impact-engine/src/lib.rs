//! Line-impact engine: which baseline lines does each labelled variant touch?
//!
//! A session holds one baseline and accumulates, per line, the verdicts of
//! every variant added to it. Each variant's edit script is reconciled into
//! one `SAME`/`CHANGED`/`REMOVED` verdict per baseline line, plus `ADDED`
//! verdicts on the line new content follows (or the sentinel slot before
//! the first line).
//!
//! # Key Types
//!
//! - [`Changes`] -- Session facade: add variants, query counts, build reports
//! - [`FileState`] / [`Bucket`] -- Per-slot annotation storage
//! - [`Reconciler`] -- Turns a hunk stream into per-slot verdicts
//! - [`RawExport`] -- Owned snapshot of every bucket, JSON-serializable
//! - [`ReportRow`] / [`ReportOptions`] -- Rows for an external renderer
//! - [`SessionConfig`] -- TOML-loadable session settings

pub mod bucket;
pub mod changes;
pub mod config;
pub mod error;
pub mod export;
pub mod reconcile;
pub mod report;
pub mod state;

pub use bucket::Bucket;
pub use changes::Changes;
pub use config::SessionConfig;
pub use error::{EngineError, EngineResult, OrderingKind};
pub use export::{RawEntry, RawExport};
pub use reconcile::{Assignment, Reconciler};
pub use report::{build_rows, label_stats, LabelStat, ReportOptions, ReportRow};
pub use state::FileState;

pub use impact_diff::{DiffAlgorithm, DiffSource, EditScript, Hunk, LineDiffer};
pub use impact_types::{Annotation, Classification, Label, Slot};
