//! Error types for the engine.

use std::fmt;

use impact_diff::DiffError;
use impact_types::{Slot, TypeError};

/// How a reconciliation pass broke slot ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderingKind {
    /// A slot earlier than one already visited.
    Regressed,
    /// The same slot visited twice with a verdict it already received.
    Repeated,
}

impl fmt::Display for OrderingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regressed => f.write_str("regressed"),
            Self::Repeated => f.write_str("repeated"),
        }
    }
}

/// Errors that abort adding one variant to a session.
///
/// All of them point at a defect in the diff source. Annotations committed
/// for earlier variants are never affected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Malformed or unrecognized edit operation.
    #[error("diff source error: {0}")]
    DiffSource(DiffError),

    /// The edit stream revisited or went back to a slot.
    #[error("ordering violation: slot {slot} {kind} (last visited {last})")]
    OrderingViolation {
        slot: Slot,
        last: Slot,
        kind: OrderingKind,
    },

    /// An operation that maps to none of the four classifications.
    #[error("unknown classification: {0:?}")]
    UnknownClassification(String),

    /// Session configuration could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Export serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<DiffError> for EngineError {
    fn from(err: DiffError) -> Self {
        match err {
            DiffError::UnknownClassification { marker, .. } => Self::UnknownClassification(marker),
            DiffError::Type(err) => err.into(),
            other => Self::DiffSource(other),
        }
    }
}

impl From<TypeError> for EngineError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnknownClassification(name) => Self::UnknownClassification(name),
            other => Self::DiffSource(DiffError::Type(other)),
        }
    }
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
