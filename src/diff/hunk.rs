//! Hunk extraction from unified diff text.
//!
//! A hunk is one contiguous block of change bounded by a `@@ -old +new @@`
//! header. Parsing is permissive: lines that are not recognized as hunk
//! headers are inert, so arbitrary text yields an empty result rather than
//! an error.

use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::u32 as dec_u32,
    combinator::opt,
    sequence::preceded,
};
use std::fmt;

/// A single hunk from a unified diff.
///
/// `header` is the literal `@@ ... @@` line (including any trailing context
/// git appends after the closing marker). `lines` are the content lines
/// that followed it, verbatim, with their `+`/`-`/space prefixes intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// Starting line number in the old file
    pub old_start: u32,
    /// Number of lines in the old file (1 when the header omits the count)
    pub old_count: u32,
    /// Starting line number in the new file
    pub new_start: u32,
    /// Number of lines in the new file (1 when the header omits the count)
    pub new_count: u32,
    /// The literal `@@ ... @@` header line
    pub header: String,
    /// Content lines belonging to this hunk, header excluded
    pub lines: Vec<String>,
}

impl DiffHunk {
    /// Extract every hunk from the given diff text, in order.
    ///
    /// Intended for a single file's diff slice, but tolerant of multi-file
    /// blobs: a hunk's lines are consumed until the next hunk header, a
    /// `diff --git` boundary, or a `--- `/`+++ ` file marker, so hunks from
    /// different files never bleed into each other. Callers that need
    /// per-file hunk sets should slice with
    /// [`FileDiff::parse_all`](crate::diff::FileDiff::parse_all) first.
    #[must_use]
    pub fn parse_all(diff_text: &str) -> Vec<DiffHunk> {
        let lines: Vec<&str> = diff_text.lines().collect();
        let mut hunks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let Some((old_start, old_count, new_start, new_count)) = parse_hunk_header(lines[i])
            else {
                i += 1;
                continue;
            };

            let header = lines[i].to_string();
            let mut hunk_lines = Vec::new();

            i += 1;
            while i < lines.len() {
                let next = lines[i];
                if next.starts_with("@@")
                    || next.starts_with("diff --git")
                    || next.starts_with("--- ")
                    || next.starts_with("+++ ")
                {
                    break;
                }
                hunk_lines.push(next.to_string());
                i += 1;
            }

            hunks.push(DiffHunk {
                old_start,
                old_count,
                new_start,
                new_count,
                header,
                lines: hunk_lines,
            });
        }

        hunks
    }
}

impl fmt::Display for DiffHunk {
    /// Render the hunk as it appeared in the diff: header line followed by
    /// the content lines, newline separated, no trailing newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        for line in &self.lines {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

/// Parse a hunk header line into `(old_start, old_count, new_start, new_count)`.
///
/// Accepts `@@ -<start>[,<count>] +<start>[,<count>] @@` with optional
/// trailing context after the closing marker. An omitted count defaults to
/// 1 per the unified-diff convention. Returns `None` for anything else.
#[must_use]
pub fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    match hunk_coords(line) {
        Ok((_, ((old_start, old_count), (new_start, new_count)))) => {
            Some((old_start, old_count, new_start, new_count))
        }
        Err(_) => None,
    }
}

/// `<start>[,<count>]`, count defaulting to 1
fn hunk_range(input: &str) -> IResult<&str, (u32, u32)> {
    let (input, start) = dec_u32(input)?;
    let (input, count) = opt(preceded(tag(","), dec_u32)).parse(input)?;
    Ok((input, (start, count.unwrap_or(1))))
}

fn hunk_coords(input: &str) -> IResult<&str, ((u32, u32), (u32, u32))> {
    let (input, _) = tag("@@ -").parse(input)?;
    let (input, old) = hunk_range(input)?;
    let (input, _) = tag(" +").parse(input)?;
    let (input, new) = hunk_range(input)?;
    let (input, _) = tag(" @@").parse(input)?;
    Ok((input, (old, new)))
}

/// Find the 0-indexed line of the next hunk header after `current_line`.
///
/// Navigation helper for display layers rendering raw diff text.
#[must_use]
pub fn next_hunk_line(diff_text: &str, current_line: usize) -> Option<usize> {
    diff_text
        .lines()
        .enumerate()
        .skip(current_line + 1)
        .find(|(_, line)| line.starts_with("@@"))
        .map(|(i, _)| i)
}

/// Find the 0-indexed line of the closest hunk header before `current_line`.
#[must_use]
pub fn previous_hunk_line(diff_text: &str, current_line: usize) -> Option<usize> {
    diff_text
        .lines()
        .enumerate()
        .take(current_line)
        .filter(|(_, line)| line.starts_with("@@"))
        .last()
        .map(|(i, _)| i)
}
