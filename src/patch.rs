//! Reconstruction of self-contained patches from parsed hunks.
//!
//! The builders reuse the original diff's fragments verbatim: a hunk's
//! header and lines are emitted unmodified, wrapped in a synthesized file
//! header block. The output assumes the consumer invokes `git apply` with
//! `--unidiff-zero`, since a single hunk does not carry the full-file
//! context a stock apply expects. Patches are newline separated with no
//! trailing-newline guarantee; the apply boundary adds one before piping.

use crate::diff::{DiffHunk, FileDiff, FileStatus, parse_hunk_header};

/// Index line placeholder when the original diff did not carry one
const PLACEHOLDER_INDEX_NEW: &str = "index 0000000..0000000";
const PLACEHOLDER_INDEX: &str = "index 0000000..0000000 100644";

/// Find the first `index <old>..<new> [<mode>]` metadata line in a diff
/// block, if any. Some diff sources omit it.
#[must_use]
pub fn index_line(diff_text: &str) -> Option<&str> {
    diff_text.lines().find(|line| line.starts_with("index "))
}

/// Build a complete patch from a single hunk.
///
/// Emits, in order: the `diff --git` header, the new-file or modified-file
/// marker block (with the supplied index line or a placeholder), `+++`,
/// the hunk header verbatim, and the hunk lines verbatim.
#[must_use]
pub fn from_hunk(
    file_path: &str,
    hunk: &DiffHunk,
    is_new_file: bool,
    index_line: Option<&str>,
) -> String {
    let mut lines: Vec<&str> = Vec::with_capacity(hunk.lines.len() + 6);

    let git_header = format!("diff --git a/{file_path} b/{file_path}");
    let old_marker = format!("--- a/{file_path}");
    let new_marker = format!("+++ b/{file_path}");

    lines.push(&git_header);
    if is_new_file {
        lines.push("new file mode 100644");
        lines.push(index_line.unwrap_or(PLACEHOLDER_INDEX_NEW));
        lines.push("--- /dev/null");
    } else {
        lines.push(index_line.unwrap_or(PLACEHOLDER_INDEX));
        lines.push(&old_marker);
    }
    lines.push(&new_marker);

    lines.push(&hunk.header);
    lines.extend(hunk.lines.iter().map(String::as_str));

    lines.join("\n")
}

/// Build a patch for one of a file's hunks, preserving the file's index
/// line and new-file status. The target path is the file's new path.
#[must_use]
pub fn from_file_hunk(file_diff: &FileDiff, hunk: &DiffHunk) -> String {
    from_hunk(
        &file_diff.new_path,
        hunk,
        file_diff.status == FileStatus::Added,
        index_line(&file_diff.diff_text),
    )
}

/// Build a patch from a rendered-line selection over raw diff text.
///
/// `start_line` and `end_line` are 0-indexed inclusive bounds into
/// `diff_text` as a text widget renders it. Every hunk whose header line
/// falls inside the range is included, under a single synthesized file
/// header block. Returns `None` when the range contains no complete hunk
/// header; a selection covering only part of a hunk is deliberately not
/// reconstructed into a sub-hunk patch.
#[must_use]
pub fn from_selection(
    file_path: &str,
    diff_text: &str,
    start_line: usize,
    end_line: usize,
) -> Option<String> {
    let hunks = DiffHunk::parse_all(diff_text);

    // Header line indices in diff_text, positionally matching `hunks`:
    // both scans recognize headers with the same grammar, so the n-th
    // header line belongs to the n-th parsed hunk.
    let header_indices = diff_text
        .lines()
        .enumerate()
        .filter(|(_, line)| parse_hunk_header(line).is_some())
        .map(|(i, _)| i);

    let selected: Vec<&DiffHunk> = header_indices
        .zip(&hunks)
        .filter(|(i, _)| (start_line..=end_line).contains(i))
        .map(|(_, hunk)| hunk)
        .collect();

    if selected.is_empty() {
        return None;
    }

    let git_header = format!("diff --git a/{file_path} b/{file_path}");
    let old_marker = format!("--- a/{file_path}");
    let new_marker = format!("+++ b/{file_path}");

    let mut lines: Vec<&str> = vec![&git_header, PLACEHOLDER_INDEX, &old_marker, &new_marker];
    for hunk in selected {
        lines.push(&hunk.header);
        lines.extend(hunk.lines.iter().map(String::as_str));
    }

    Some(lines.join("\n"))
}
