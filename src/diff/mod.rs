//! Structured views over raw `git diff` / `git show` output.
//!
//! Everything in this module is a pure text-to-structure transformation:
//! parsing never fails, it degrades permissively and produces whatever
//! partial structure the recognized markers support. The value objects are
//! immutable once constructed and own copies of the substrings they carry.

pub mod file;
pub mod hunk;

pub use file::{FileDiff, FileStatus};
pub use hunk::{DiffHunk, next_hunk_line, parse_hunk_header, previous_hunk_line};

/// What two states were diffed. Carried as metadata on [`DiffResult`];
/// the parsers themselves never look at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    /// Working tree vs HEAD
    WorkingTree,
    /// Staged changes vs HEAD
    Staged,
    /// One commit vs its parent
    Commit,
    /// Between two commits
    CommitRange,
}

/// Aggregate statistics over a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
}

impl DiffStats {
    /// Count files, insertions and deletions in raw diff text.
    ///
    /// Permissive: each `diff --git` line is a file, each `+` content line
    /// an insertion, each `-` content line a deletion (`+++`/`---` file
    /// markers excluded). Anything else contributes nothing, so empty or
    /// unparseable input yields all zeros.
    #[must_use]
    pub fn parse(diff_text: &str) -> DiffStats {
        let mut stats = DiffStats::default();

        for line in diff_text.lines() {
            if line.starts_with("diff --git") {
                stats.files_changed += 1;
            } else if line.starts_with('+') && !line.starts_with("+++") {
                stats.insertions += 1;
            } else if line.starts_with('-') && !line.starts_with("---") {
                stats.deletions += 1;
            }
        }

        stats
    }

    /// Total number of changed lines.
    #[must_use]
    pub fn total_changes(&self) -> u32 {
        self.insertions + self.deletions
    }
}

/// A complete parsed diff: the raw text plus its derived structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub mode: DiffMode,
    pub diff_text: String,
    pub stats: DiffStats,
    pub files: Vec<FileDiff>,
    /// First (or only) commit involved, for [`DiffMode::Commit`] and
    /// [`DiffMode::CommitRange`]
    pub commit_sha: Option<String>,
    /// Second commit, for [`DiffMode::CommitRange`]
    pub commit_sha2: Option<String>,
}

impl DiffResult {
    /// Parse raw diff text into stats and per-file records. Commit
    /// metadata defaults to `None`.
    #[must_use]
    pub fn parse(mode: DiffMode, diff_text: String) -> DiffResult {
        let stats = DiffStats::parse(&diff_text);
        let files = FileDiff::parse_all(&diff_text);
        DiffResult {
            mode,
            diff_text,
            stats,
            files,
            commit_sha: None,
            commit_sha2: None,
        }
    }
}
