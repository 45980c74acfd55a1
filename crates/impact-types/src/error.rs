use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown classification: {0:?}")]
    UnknownClassification(String),

    #[error("invalid slot index: {0}")]
    InvalidSlot(i64),
}
