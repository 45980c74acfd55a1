//! Error types for the diff crate.

use impact_types::TypeError;

/// Errors raised by a diff source or while decoding its output.
///
/// All of these are defects in the diff source (or its adapter), not
/// expected runtime conditions.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A `@@ ... @@` header could not be parsed.
    #[error("malformed hunk header at line {line}: {text:?}")]
    MalformedHeader { line: usize, text: String },

    /// A line that is neither a file header, hunk header, nor hunk body.
    #[error("unexpected line {line} in unified diff: {text:?}")]
    UnexpectedLine { line: usize, text: String },

    /// The diff text ended before a hunk's announced body lines.
    #[error("hunk at baseline index {old_start} is truncated: {missing} body lines missing")]
    TruncatedHunk { old_start: usize, missing: usize },

    /// A hunk that neither removes nor inserts anything.
    #[error("empty hunk at baseline index {old_start}")]
    EmptyHunk { old_start: usize },

    /// A hunk reaching past the end of the baseline or variant.
    #[error("hunk {side} range {start}..{end} exceeds length {len}")]
    HunkOutOfRange {
        side: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },

    /// The edit script was computed against a baseline of another length.
    #[error("edit script covers {actual} baseline lines, session has {expected}")]
    BaselineMismatch { expected: usize, actual: usize },

    /// The lines between two hunks differ in number on the two sides.
    #[error("hunk at baseline index {old_start} starts at variant index {new_start}, expected {expected}")]
    Misaligned {
        old_start: usize,
        new_start: usize,
        expected: usize,
    },

    /// The hunks do not account for the declared variant length.
    #[error("edit script yields {expected} variant lines but declares {actual}")]
    VariantLengthMismatch { expected: usize, actual: usize },

    /// A marker-stream token whose prefix maps to no classification.
    #[error("unknown classification marker {marker:?} at token {token}")]
    UnknownClassification { token: usize, marker: String },

    /// Type-level conversion failure.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
