//! Per-file splitting of multi-file diff text.
//!
//! A file's boundary in git diff output is only recognizable by the *next*
//! `diff --git` header or end-of-input, never by a closing marker. The
//! splitter therefore runs as a single forward scan with one open
//! accumulator, flushed on boundary or EOF.

use super::hunk::DiffHunk;
use std::fmt;

/// How a file changed between the two diffed states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileStatus::Added => "added",
            FileStatus::Deleted => "deleted",
            FileStatus::Modified => "modified",
            FileStatus::Renamed => "renamed",
        };
        f.write_str(name)
    }
}

/// One file's slice of a multi-file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path on the old side (`a/` prefix stripped)
    pub old_path: String,
    /// Path on the new side (`b/` prefix stripped)
    pub new_path: String,
    pub status: FileStatus,
    /// This file's verbatim slice of the raw diff, `diff --git` line included
    pub diff_text: String,
    /// Count of `+` content lines in this file's slice
    pub insertions: u32,
    /// Count of `-` content lines in this file's slice
    pub deletions: u32,
}

impl FileDiff {
    /// Split multi-file diff text into per-file records.
    ///
    /// Permissive by contract: input with no `diff --git` line yields an
    /// empty vec, and unrecognized lines inside a file's slice are buffered
    /// verbatim without affecting status or counters. A file with zero
    /// detected changes (a pure rename) is still emitted.
    #[must_use]
    pub fn parse_all(diff_text: &str) -> Vec<FileDiff> {
        let mut files = Vec::new();
        let mut state = ScanState::NoFileOpen;

        for line in diff_text.lines() {
            if line.starts_with("diff --git") {
                if let ScanState::FileOpen(acc) = state {
                    files.push(acc.finish());
                }
                state = match FileAccumulator::open(line) {
                    Some(acc) => ScanState::FileOpen(acc),
                    // Header whose paths cannot be split: inert
                    None => ScanState::NoFileOpen,
                };
            } else if let ScanState::FileOpen(acc) = &mut state {
                acc.push_line(line);
            }
        }

        if let ScanState::FileOpen(acc) = state {
            files.push(acc.finish());
        }

        files
    }

    /// Parse this file's hunks from its diff text.
    ///
    /// Hunks are derived on demand rather than stored; the record itself
    /// stays an immutable value object.
    #[must_use]
    pub fn hunks(&self) -> Vec<DiffHunk> {
        DiffHunk::parse_all(&self.diff_text)
    }
}

/// File-splitting scan state: either between files or accumulating one.
enum ScanState {
    NoFileOpen,
    FileOpen(FileAccumulator),
}

/// The currently open file record, flushed on the next boundary or EOF.
struct FileAccumulator {
    old_path: String,
    new_path: String,
    status: FileStatus,
    buffer: String,
    insertions: u32,
    deletions: u32,
}

impl FileAccumulator {
    /// Open an accumulator from a `diff --git a/<old> b/<new>` line.
    /// Returns `None` when both paths cannot be extracted.
    fn open(header: &str) -> Option<Self> {
        let parts: Vec<&str> = header.split(' ').collect();
        if parts.len() < 4 {
            return None;
        }
        let old_path = parts[2].strip_prefix("a/").unwrap_or(parts[2]);
        let new_path = parts[3].strip_prefix("b/").unwrap_or(parts[3]);

        Some(FileAccumulator {
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
            status: FileStatus::Modified,
            buffer: header.to_string(),
            insertions: 0,
            deletions: 0,
        })
    }

    /// Buffer a line verbatim and inspect it for status markers and
    /// insertion/deletion counting.
    fn push_line(&mut self, line: &str) {
        self.buffer.push('\n');
        self.buffer.push_str(line);

        if line.starts_with("new file mode") {
            self.status = FileStatus::Added;
        } else if line.starts_with("deleted file mode") {
            self.status = FileStatus::Deleted;
        } else if line.starts_with("rename from") {
            self.status = FileStatus::Renamed;
        }

        if line.starts_with('+') && !line.starts_with("+++") {
            self.insertions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            self.deletions += 1;
        }
    }

    fn finish(self) -> FileDiff {
        FileDiff {
            old_path: self.old_path,
            new_path: self.new_path,
            status: self.status,
            diff_text: self.buffer,
            insertions: self.insertions,
            deletions: self.deletions,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn parse_empty_input() {
        assert!(FileDiff::parse_all("").is_empty());
    }

    #[test]
    fn parse_input_without_file_header() {
        // Hunk-ish text with no diff --git line is not an error
        let text = "@@ -1 +1 @@\n-old\n+new\n";
        assert!(FileDiff::parse_all(text).is_empty());
    }

    #[test]
    fn parse_modified_file() {
        let text = "diff --git a/config.nix b/config.nix\nindex fa2da6e..41114ff 100644\n--- a/config.nix\n+++ b/config.nix\n@@ -3 +3 @@\n-old line\n+new line";
        let files = FileDiff::parse_all(text);
        assert_eq!(files.len(), 1);

        let file = &files[0];
        assert_eq!(file.old_path, "config.nix");
        assert_eq!(file.new_path, "config.nix");
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!(file.insertions, 1);
        assert_eq!(file.deletions, 1);
        assert_eq!(file.diff_text, text);
    }

    #[test]
    fn parse_two_files_with_independent_counts() {
        let text = concat!(
            "diff --git a/a.txt b/a.txt\n",
            "index 1111111..2222222 100644\n",
            "--- a/a.txt\n",
            "+++ b/a.txt\n",
            "@@ -1 +1 @@\n",
            "-old\n",
            "+new\n",
            "diff --git a/b.txt b/b.txt\n",
            "new file mode 100644\n",
            "index 0000000..3333333\n",
            "--- /dev/null\n",
            "+++ b/b.txt\n",
            "@@ -0,0 +1,2 @@\n",
            "+first\n",
            "+second",
        );
        let files = FileDiff::parse_all(text);
        assert_eq!(files.len(), 2);

        assert_eq!(files[0].new_path, "a.txt");
        assert_eq!(files[0].status, FileStatus::Modified);
        assert_eq!(files[0].insertions, 1);
        assert_eq!(files[0].deletions, 1);

        assert_eq!(files[1].new_path, "b.txt");
        assert_eq!(files[1].status, FileStatus::Added);
        assert_eq!(files[1].insertions, 2);
        assert_eq!(files[1].deletions, 0);
    }

    #[test]
    fn parse_deleted_file() {
        let text = "diff --git a/gone.txt b/gone.txt\ndeleted file mode 100644\nindex 1111111..0000000\n--- a/gone.txt\n+++ /dev/null\n@@ -1,2 +0,0 @@\n-one\n-two";
        let files = FileDiff::parse_all(text);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].status, FileStatus::Deleted);
        assert_eq!(files[0].insertions, 0);
        assert_eq!(files[0].deletions, 2);
    }

    #[test]
    fn parse_pure_rename_flushes_zero_change_file() {
        let text = concat!(
            "diff --git a/old_name.txt b/new_name.txt\n",
            "similarity index 100%\n",
            "rename from old_name.txt\n",
            "rename to new_name.txt\n",
            "diff --git a/other.txt b/other.txt\n",
            "index 1111111..2222222 100644\n",
            "--- a/other.txt\n",
            "+++ b/other.txt\n",
            "@@ -1 +1 @@\n",
            "-x\n",
            "+y",
        );
        let files = FileDiff::parse_all(text);
        assert_eq!(files.len(), 2);

        assert_eq!(files[0].old_path, "old_name.txt");
        assert_eq!(files[0].new_path, "new_name.txt");
        assert_eq!(files[0].status, FileStatus::Renamed);
        assert_eq!(files[0].insertions, 0);
        assert_eq!(files[0].deletions, 0);
    }

    #[test]
    fn marker_lines_do_not_count_as_changes() {
        let text = "diff --git a/f b/f\nindex 1..2 100644\n--- a/f\n+++ b/f\n@@ -1 +1 @@\n-old\n+new";
        let files = FileDiff::parse_all(text);
        assert_eq!(files[0].insertions, 1);
        assert_eq!(files[0].deletions, 1);
    }

    #[test]
    fn malformed_file_header_is_inert() {
        // A diff --git line with missing paths flushes the open file but
        // opens nothing; following lines are dropped until the next header
        let text = concat!(
            "diff --git a/a.txt b/a.txt\n",
            "index 1..2 100644\n",
            "--- a/a.txt\n",
            "+++ b/a.txt\n",
            "@@ -1 +1 @@\n",
            "-old\n",
            "+new\n",
            "diff --git\n",
            "+stray line\n",
            "diff --git a/b.txt b/b.txt\n",
            "index 3..4 100644\n",
            "--- a/b.txt\n",
            "+++ b/b.txt\n",
            "@@ -2 +2 @@\n",
            "-p\n",
            "+q",
        );
        let files = FileDiff::parse_all(text);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].new_path, "a.txt");
        assert_eq!(files[1].new_path, "b.txt");
        assert_eq!(files[1].insertions, 1);
    }

    #[test]
    fn hunks_derived_from_file_slice() {
        let text = concat!(
            "diff --git a/a.txt b/a.txt\n",
            "index 1..2 100644\n",
            "--- a/a.txt\n",
            "+++ b/a.txt\n",
            "@@ -1 +1 @@\n",
            "-old\n",
            "+new\n",
            "diff --git a/b.txt b/b.txt\n",
            "index 3..4 100644\n",
            "--- a/b.txt\n",
            "+++ b/b.txt\n",
            "@@ -7,2 +7,2 @@\n",
            "-p\n",
            "+q",
        );
        let files = FileDiff::parse_all(text);

        let a_hunks = files[0].hunks();
        assert_eq!(a_hunks.len(), 1);
        assert_eq!(a_hunks[0].old_start, 1);
        assert_eq!(a_hunks[0].lines, vec!["-old", "+new"]);

        let b_hunks = files[1].hunks();
        assert_eq!(b_hunks.len(), 1);
        assert_eq!(b_hunks[0].old_start, 7);
        assert_eq!(b_hunks[0].old_count, 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::diff::DiffStats;
    use proptest::prelude::*;

    /// Printable line content that cannot be mistaken for a diff marker
    fn arb_line_content() -> impl Strategy<Value = String> {
        prop::collection::vec(prop::char::range('a', 'z'), 1..20)
            .prop_map(|chars| chars.into_iter().collect())
    }

    /// One synthetic modified-file diff block with the given change shape
    fn arb_file_block() -> impl Strategy<Value = (String, u32, u32)> {
        (
            "[a-z]{1,12}",
            prop::collection::vec(arb_line_content(), 0..5),
            prop::collection::vec(arb_line_content(), 0..5),
        )
            .prop_map(|(name, adds, dels)| {
                let path = format!("{name}.txt");
                let mut block = format!(
                    "diff --git a/{path} b/{path}\nindex 1111111..2222222 100644\n--- a/{path}\n+++ b/{path}\n@@ -1,{} +1,{} @@\n",
                    dels.len(),
                    adds.len()
                );
                for d in &dels {
                    block.push('-');
                    block.push_str(d);
                    block.push('\n');
                }
                for a in &adds {
                    block.push('+');
                    block.push_str(a);
                    block.push('\n');
                }
                (block, adds.len() as u32, dels.len() as u32)
            })
    }

    proptest! {
        /// Per-file counters from the splitter must sum to the aggregate
        /// statistics over the same text
        #[test]
        fn file_counters_sum_to_aggregate_stats(
            blocks in prop::collection::vec(arb_file_block(), 1..5)
        ) {
            let text: String = blocks.iter().map(|(b, _, _)| b.as_str()).collect();
            let stats = DiffStats::parse(&text);
            let files = FileDiff::parse_all(&text);

            prop_assert_eq!(files.len() as u32, stats.files_changed);
            prop_assert_eq!(
                files.iter().map(|f| f.insertions).sum::<u32>(),
                stats.insertions
            );
            prop_assert_eq!(
                files.iter().map(|f| f.deletions).sum::<u32>(),
                stats.deletions
            );

            for (file, (_, adds, dels)) in files.iter().zip(&blocks) {
                prop_assert_eq!(file.insertions, *adds);
                prop_assert_eq!(file.deletions, *dels);
            }
        }

        /// Every file slice re-parsed on its own yields the same hunks as
        /// hunk extraction over the whole blob
        #[test]
        fn per_file_hunks_match_whole_blob_hunks(
            blocks in prop::collection::vec(arb_file_block(), 1..5)
        ) {
            let text: String = blocks.iter().map(|(b, _, _)| b.as_str()).collect();
            let whole: Vec<_> = crate::diff::DiffHunk::parse_all(&text);
            let per_file: Vec<_> = FileDiff::parse_all(&text)
                .iter()
                .flat_map(|f| f.hunks())
                .collect();
            prop_assert_eq!(per_file, whole);
        }
    }
}
