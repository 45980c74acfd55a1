//! Marker streams (`ndiff` style) converted to the canonical hunk stream.
//!
//! Each token starts with a two-character code: `"  "` common, `"- "`
//! baseline only, `"+ "` variant only, `"? "` intra-line hint. Hints carry no
//! line and never advance a counter.
//!
//! A `-` run followed by a `+` run becomes a single hunk, so the positional
//! pairing of the two runs falls out of the hunk rules. A `-` arriving after
//! `+` lines closes the pending hunk: the `+` lines then stand alone as an
//! insertion and the `-` lines as a removal.

use impact_types::Classification;

use crate::error::{DiffError, DiffResult};
use crate::hunk::{EditScript, Hunk};

/// Map a marker token to the classification its prefix stands for.
///
/// The outer `None` means the prefix is not a marker at all; `Some(None)`
/// is an advisory `"? "` line.
pub fn marker_classification(token: &str) -> Option<Option<Classification>> {
    match token.get(..2)? {
        "  " => Some(Some(Classification::Same)),
        "- " => Some(Some(Classification::Removed)),
        "+ " => Some(Some(Classification::Added)),
        "? " => Some(None),
        _ => None,
    }
}

/// Convert a marker stream into an [`EditScript`].
pub fn parse_markers<I, S>(tokens: I) -> DiffResult<EditScript>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut old_pos = 0usize;
    let mut new_pos = 0usize;
    let mut hunks = Vec::new();
    let mut pending: Option<Hunk> = None;

    for (index, token) in tokens.into_iter().enumerate() {
        let token = token.as_ref();
        let class = marker_classification(token).ok_or_else(|| {
            DiffError::UnknownClassification {
                token: index,
                marker: token.chars().take(2).collect(),
            }
        })?;

        match class {
            None => {}
            Some(Classification::Removed) => {
                match pending {
                    Some(hunk) if hunk.new_len == 0 => {
                        pending = Some(Hunk {
                            old_len: hunk.old_len + 1,
                            ..hunk
                        });
                    }
                    _ => {
                        hunks.extend(pending.take());
                        pending = Some(Hunk::new(old_pos, 1, new_pos, 0));
                    }
                }
                old_pos += 1;
            }
            Some(Classification::Added) => {
                match pending.as_mut() {
                    Some(hunk) => hunk.new_len += 1,
                    None => pending = Some(Hunk::new(old_pos, 0, new_pos, 1)),
                }
                new_pos += 1;
            }
            Some(_) => {
                hunks.extend(pending.take());
                old_pos += 1;
                new_pos += 1;
            }
        }
    }
    hunks.extend(pending);

    Ok(EditScript::new(old_pos, new_pos, hunks))
}
