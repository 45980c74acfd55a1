//! Zero-context unified diff text: the wire format between an external diff
//! tool and the engine.
//!
//! Hunk headers use 1-based starts. A zero count means the start names the
//! line *before* the hunk, and an omitted count means one line, so
//! `@@ -0,0 +1 @@` inserts one line at the top of the file and
//! `@@ -3 +3,2 @@` replaces line 3 with two lines.

use std::fmt::Write;

use crate::error::{DiffError, DiffResult};
use crate::hunk::{EditScript, Hunk};

const NO_NEWLINE_HINT: &str = "\\ No newline at end of file";

/// Parse zero-context unified diff text into an [`EditScript`].
///
/// `--- `/`+++ ` file headers are accepted before the first hunk. Hunk bodies
/// must contain exactly the announced number of `-` and `+` lines; context
/// lines are not allowed.
///
/// Every line outside a hunk is common to both sides, so the variant length
/// follows from `old_len` and the hunk counts.
pub fn parse_unified(text: &str, old_len: usize) -> DiffResult<EditScript> {
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut remaining_old = 0usize;
    let mut remaining_new = 0usize;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;

        if remaining_old > 0 && line.starts_with('-') {
            remaining_old -= 1;
            continue;
        }
        if remaining_new > 0 && line.starts_with('+') {
            remaining_new -= 1;
            continue;
        }
        if line.starts_with(NO_NEWLINE_HINT) {
            continue;
        }
        if remaining_old > 0 || remaining_new > 0 {
            return Err(DiffError::UnexpectedLine {
                line: line_no,
                text: line.to_string(),
            });
        }

        if line.starts_with("@@") {
            let hunk = parse_header(line).ok_or_else(|| DiffError::MalformedHeader {
                line: line_no,
                text: line.to_string(),
            })?;
            // The variant length is only known once all hunks are read.
            hunk.check_bounds(old_len, usize::MAX)?;
            remaining_old = hunk.old_len;
            remaining_new = hunk.new_len;
            hunks.push(hunk);
            continue;
        }

        let is_file_header = line.starts_with("--- ") || line.starts_with("+++ ");
        if hunks.is_empty() && (is_file_header || line.is_empty()) {
            continue;
        }

        return Err(DiffError::UnexpectedLine {
            line: line_no,
            text: line.to_string(),
        });
    }

    let Some(last) = hunks.last().copied() else {
        return Ok(EditScript::new(old_len, old_len, hunks));
    };
    if remaining_old > 0 || remaining_new > 0 {
        return Err(DiffError::TruncatedHunk {
            old_start: last.old_start,
            missing: remaining_old.saturating_add(remaining_new),
        });
    }

    let deletions: usize = hunks.iter().map(|h| h.old_len).sum();
    let additions: usize = hunks.iter().map(|h| h.new_len).sum();
    let new_len = old_len
        .checked_sub(deletions)
        .and_then(|common| common.checked_add(additions))
        .ok_or_else(|| DiffError::HunkOutOfRange {
            side: "baseline",
            start: last.old_start,
            end: last.old_start.saturating_add(last.old_len),
            len: old_len,
        })?;

    Ok(EditScript::new(old_len, new_len, hunks))
}

/// Parse `@@ -s[,d] +t[,a] @@[ section]` into a zero-based hunk.
fn parse_header(line: &str) -> Option<Hunk> {
    let rest = line.strip_prefix("@@ ")?;
    let end = rest.find(" @@")?;
    let (old_part, new_part) = rest[..end].split_once(' ')?;

    let (old_start, old_len) = parse_range(old_part.strip_prefix('-')?)?;
    let (new_start, new_len) = parse_range(new_part.strip_prefix('+')?)?;

    Some(Hunk::new(old_start, old_len, new_start, new_len))
}

/// Parse `start[,count]` and convert the start to a zero-based index.
fn parse_range(range: &str) -> Option<(usize, usize)> {
    let (start, count) = match range.split_once(',') {
        Some((start, count)) => (start.parse::<usize>().ok()?, count.parse::<usize>().ok()?),
        None => (range.parse::<usize>().ok()?, 1),
    };

    if count == 0 {
        Some((start, 0))
    } else {
        Some((start.checked_sub(1)?, count))
    }
}

/// Format a zero-based range the way `diff -U0` does.
fn format_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{start},0"),
        1 => format!("{}", start.saturating_add(1)),
        n => format!("{},{n}", start.saturating_add(1)),
    }
}

/// Render an edit script as zero-context unified diff text.
///
/// `baseline` and `variant` supply the body lines; each is written verbatim
/// after its `-`/`+` marker, followed by a no-newline hint if it lacks a
/// terminator.
pub fn render_unified(
    script: &EditScript,
    baseline: &[&str],
    variant: &[&str],
    old_name: &str,
    new_name: &str,
) -> String {
    let mut out = String::new();
    if script.is_empty() {
        return out;
    }

    let _ = writeln!(out, "--- {old_name}");
    let _ = writeln!(out, "+++ {new_name}");

    for hunk in &script.hunks {
        let _ = writeln!(
            out,
            "@@ -{} +{} @@",
            format_range(hunk.old_start, hunk.old_len),
            format_range(hunk.new_start, hunk.new_len)
        );
        for line in baseline.iter().skip(hunk.old_start).take(hunk.old_len) {
            push_body_line(&mut out, '-', line);
        }
        for line in variant.iter().skip(hunk.new_start).take(hunk.new_len) {
            push_body_line(&mut out, '+', line);
        }
    }

    out
}

fn push_body_line(out: &mut String, marker: char, line: &str) {
    out.push(marker);
    out.push_str(line);
    if !line.ends_with('\n') {
        out.push('\n');
        out.push_str(NO_NEWLINE_HINT);
        out.push('\n');
    }
}
