//! Unified diff parsing and hunk-level patch reconstruction for git.
//!
//! The core of this crate is a pure text-to-structure-to-text library:
//! [`diff`] parses raw `git diff`/`git show` output into statistics,
//! per-file records and per-hunk records, and [`patch`] rebuilds minimal
//! self-contained patches from a hunk or a line-range selection. None of
//! that touches a repository.
//!
//! [`GitRepo`] is the thin boundary around the external git tool: it
//! produces the raw diff text for the four comparison modes and pipes
//! reconstructed patches to `git apply --cached [--reverse]
//! --unidiff-zero` to stage or unstage a single fragment of a change.
//!
//! Callers must serialize stage/unstage invocations per repository: two
//! concurrent partial-patch applications against the same index can race
//! and corrupt it.

use error_set::error_set;
use std::process::Command;

pub mod diff;
pub mod patch;

pub use diff::{DiffHunk, DiffMode, DiffResult, DiffStats, FileDiff, FileStatus};

error_set! {
    /// Top-level error for git-hunks operations
    GitHunksError := {
        #[display("No changes found in {file}")]
        NoChanges { file: String },
        #[display("{file} does not appear in the diff")]
        FileNotInDiff { file: String },
        #[display("No hunk {index} in {file}: the diff has {available} hunk(s)")]
        NoSuchHunk { file: String, index: usize, available: usize },
    } || GitCommandError

    /// Errors from git command execution
    GitCommandError := {
        #[display("Failed to run git {command}: {message}")]
        SpawnFailed { command: String, message: String },
        #[display("git {command} failed: {stderr}")]
        ExitError { command: String, stderr: String },
        #[display("Invalid UTF-8 in git output: {message}")]
        InvalidUtf8 { message: String },
        #[display("Failed to get stdin handle for git apply")]
        ApplyStdinFailed,
        #[display("Failed to write patch to git apply: {message}")]
        ApplyWriteFailed { message: String },
        #[display("Failed to wait for git apply: {message}")]
        ApplyWaitFailed { message: String },
    }
}

/// Boundary around the external git tool for one repository.
///
/// Holds no state beyond the repository path; every method is one blocking
/// child-process invocation.
pub struct GitRepo<'a> {
    repo_path: &'a str,
}

impl<'a> GitRepo<'a> {
    /// Create a handle for the repository at the given path.
    pub fn new(repo_path: &'a str) -> Self {
        Self { repo_path }
    }

    /// Diff the working tree against HEAD, optionally for a single file.
    ///
    /// # Examples
    /// ```no_run
    /// # use git_hunks::GitRepo;
    /// let repo = GitRepo::new(".");
    /// let result = repo.working_tree_diff(None)?;
    /// println!("{} file(s) changed", result.stats.files_changed);
    /// # Ok::<(), git_hunks::GitCommandError>(())
    /// ```
    pub fn working_tree_diff(&self, file: Option<&str>) -> Result<DiffResult, GitCommandError> {
        let mut args = vec!["diff", "--no-ext-diff", "--no-color", "HEAD"];
        if let Some(file) = file {
            args.extend(["--", file]);
        }
        let text = self.run_git("diff", &args)?;
        Ok(DiffResult::parse(DiffMode::WorkingTree, text))
    }

    /// Diff the staging area against HEAD, optionally for a single file.
    pub fn staged_diff(&self, file: Option<&str>) -> Result<DiffResult, GitCommandError> {
        let mut args = vec!["diff", "--no-ext-diff", "--no-color", "--cached"];
        if let Some(file) = file {
            args.extend(["--", file]);
        }
        let text = self.run_git("diff", &args)?;
        Ok(DiffResult::parse(DiffMode::Staged, text))
    }

    /// Diff a commit against its parent.
    pub fn commit_diff(
        &self,
        commit_sha: &str,
        file: Option<&str>,
    ) -> Result<DiffResult, GitCommandError> {
        let mut args = vec!["show", "--no-color", "--format=", commit_sha];
        if let Some(file) = file {
            args.extend(["--", file]);
        }
        let text = self.run_git("show", &args)?;
        let mut result = DiffResult::parse(DiffMode::Commit, text);
        result.commit_sha = Some(commit_sha.to_string());
        Ok(result)
    }

    /// Diff between two commits.
    pub fn commit_range_diff(
        &self,
        commit_sha1: &str,
        commit_sha2: &str,
        file: Option<&str>,
    ) -> Result<DiffResult, GitCommandError> {
        let mut args = vec!["diff", "--no-ext-diff", "--no-color", commit_sha1, commit_sha2];
        if let Some(file) = file {
            args.extend(["--", file]);
        }
        let text = self.run_git("diff", &args)?;
        let mut result = DiffResult::parse(DiffMode::CommitRange, text);
        result.commit_sha = Some(commit_sha1.to_string());
        result.commit_sha2 = Some(commit_sha2.to_string());
        Ok(result)
    }

    /// Stage a patch: apply it to the index.
    pub fn stage_hunk(&self, patch: &str) -> Result<(), GitCommandError> {
        self.apply_patch(patch, true, false)
    }

    /// Unstage a patch: reverse-apply it to the index.
    pub fn unstage_hunk(&self, patch: &str) -> Result<(), GitCommandError> {
        self.apply_patch(patch, true, true)
    }

    /// Stage the n-th (0-indexed) hunk of a file's unstaged changes.
    ///
    /// # Examples
    /// ```no_run
    /// # use git_hunks::GitRepo;
    /// let repo = GitRepo::new(".");
    /// repo.stage_hunk_at("src/config.rs", 0)?;
    /// # Ok::<(), git_hunks::GitHunksError>(())
    /// ```
    pub fn stage_hunk_at(&self, file: &str, index: usize) -> Result<(), GitHunksError> {
        let result = self.working_tree_diff(Some(file))?;
        let patch = self.file_hunk_patch(&result, file, index)?;
        Ok(self.stage_hunk(&patch)?)
    }

    /// Unstage the n-th (0-indexed) hunk of a file's staged changes.
    pub fn unstage_hunk_at(&self, file: &str, index: usize) -> Result<(), GitHunksError> {
        let result = self.staged_diff(Some(file))?;
        let patch = self.file_hunk_patch(&result, file, index)?;
        Ok(self.unstage_hunk(&patch)?)
    }

    /// Locate a file's n-th hunk in a parsed diff and rebuild its patch.
    fn file_hunk_patch(
        &self,
        result: &DiffResult,
        file: &str,
        index: usize,
    ) -> Result<String, GitHunksError> {
        if result.diff_text.trim().is_empty() {
            return Err(GitHunksError::NoChanges {
                file: file.to_string(),
            });
        }

        let file_diff = result
            .files
            .iter()
            .find(|f| f.new_path == file || f.old_path == file)
            .ok_or_else(|| GitHunksError::FileNotInDiff {
                file: file.to_string(),
            })?;

        let hunks = file_diff.hunks();
        let hunk = hunks.get(index).ok_or_else(|| GitHunksError::NoSuchHunk {
            file: file.to_string(),
            index,
            available: hunks.len(),
        })?;

        Ok(patch::from_file_hunk(file_diff, hunk))
    }

    /// Run a git subcommand and capture its stdout.
    fn run_git(&self, command: &str, args: &[&str]) -> Result<String, GitCommandError> {
        let output = Command::new("git")
            .args(["-C", self.repo_path])
            .args(args)
            .output()
            .map_err(|e| GitCommandError::SpawnFailed {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitCommandError::ExitError {
                command: command.to_string(),
                stderr: stderr.into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| GitCommandError::InvalidUtf8 {
            message: e.to_string(),
        })
    }

    /// Pipe a patch to `git apply`.
    ///
    /// `cached` targets the index instead of the working tree; `reverse`
    /// inverts the patch. `--unidiff-zero` is always passed because
    /// reconstructed hunk patches may lack surrounding context. The patch
    /// text is given a trailing newline if it is missing one.
    pub fn apply_patch(
        &self,
        patch: &str,
        cached: bool,
        reverse: bool,
    ) -> Result<(), GitCommandError> {
        use std::io::Write;

        let mut args = vec!["-C", self.repo_path, "apply"];
        if cached {
            args.push("--cached");
        }
        if reverse {
            args.push("--reverse");
        }
        args.extend(["--unidiff-zero", "-"]);

        let mut child = Command::new("git")
            .args(&args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| GitCommandError::SpawnFailed {
                command: "apply".to_string(),
                message: e.to_string(),
            })?;

        let mut stdin = child.stdin.take().ok_or(GitCommandError::ApplyStdinFailed)?;
        stdin
            .write_all(patch.as_bytes())
            .and_then(|()| {
                if patch.ends_with('\n') {
                    Ok(())
                } else {
                    stdin.write_all(b"\n")
                }
            })
            .map_err(|e| GitCommandError::ApplyWriteFailed {
                message: e.to_string(),
            })?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .map_err(|e| GitCommandError::ApplyWaitFailed {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitCommandError::ExitError {
                command: "apply".to_string(),
                stderr: stderr.into_owned(),
            });
        }

        Ok(())
    }
}
