//! Foundation types for the line-impact engine.
//!
//! These are the values every other crate in the workspace exchanges: how a
//! baseline line was affected, where an annotation lives, and which variant
//! it came from.
//!
//! # Key Types
//!
//! - [`Classification`] -- `SAME` / `CHANGED` / `ADDED` / `REMOVED`
//! - [`Slot`] -- Baseline line index, or the sentinel before the first line
//! - [`Label`] -- Shared identity of one variant
//! - [`Annotation`] -- A (label, classification) pair

pub mod annotation;
pub mod classification;
pub mod error;
pub mod slot;

pub use annotation::{Annotation, Label};
pub use classification::Classification;
pub use error::TypeError;
pub use slot::Slot;
