//! Git-backed history queries.

use std::process::{Command, Output};

use thiserror::Error;

use crate::core::{
    parse_diff_name_status, parse_log_output, ChangedFile, CommitRecord, HistoryScope, RelPath,
    RepoRoot, LOG_FORMAT, MAX_FILE_SIZE,
};
use crate::logging::Timer;

/// Git's well-known empty tree, used as the old side of root commits.
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Bytes inspected for a NUL when sniffing binary content.
const BINARY_SNIFF_LEN: usize = 8000;

/// Errors from history queries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    /// The `git` executable could not be started.
    #[error("git is not available: {0}")]
    SourceUnavailable(std::io::Error),
    /// Git ran and reported a failure.
    #[error("{0}")]
    QueryFailed(String),
    /// The path does not exist at the revision.
    #[error("{path} does not exist at {revision}: {message}")]
    NoContentAtRevision {
        /// Revision queried.
        revision: String,
        /// Path queried.
        path: RelPath,
        /// Git's diagnostic.
        message: String,
    },
    /// Blob exceeds [`MAX_FILE_SIZE`].
    #[error("file too large: {size} bytes (max {max} bytes)")]
    FileTooLarge {
        /// Blob size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },
    /// Blob looks binary.
    #[error("binary file")]
    BinaryContent,
    /// Git printed something that is not UTF-8 where text was required.
    #[error("invalid utf-8 in git output")]
    InvalidUtf8,
    /// I/O error while talking to git.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl HistoryError {
    /// Whether the error describes a missing file rather than a failed query.
    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContentAtRevision { .. })
    }
}

/// Read-only access to a repository's history.
pub trait HistorySource {
    /// At most `limit` commits touching `scope`, newest first.
    fn list_commits(
        &self,
        scope: &HistoryScope,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, HistoryError>;

    /// Unified diff of `path` from `parent` (or the empty tree) to `revision`.
    fn diff(
        &self,
        revision: &str,
        path: &RelPath,
        parent: Option<&str>,
    ) -> Result<String, HistoryError>;

    /// Full text of `path` at `revision`.
    fn file_contents(&self, revision: &str, path: &RelPath) -> Result<String, HistoryError>;

    /// Files changed by `revision` relative to `parent` (or the empty tree).
    fn changed_files(
        &self,
        revision: &str,
        parent: Option<&str>,
    ) -> Result<Vec<ChangedFile>, HistoryError>;

    /// Files tracked at HEAD.
    fn tracked_files(&self) -> Result<Vec<RelPath>, HistoryError>;
}

impl<S: HistorySource + ?Sized> HistorySource for Box<S> {
    fn list_commits(
        &self,
        scope: &HistoryScope,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, HistoryError> {
        (**self).list_commits(scope, limit)
    }

    fn diff(
        &self,
        revision: &str,
        path: &RelPath,
        parent: Option<&str>,
    ) -> Result<String, HistoryError> {
        (**self).diff(revision, path, parent)
    }

    fn file_contents(&self, revision: &str, path: &RelPath) -> Result<String, HistoryError> {
        (**self).file_contents(revision, path)
    }

    fn changed_files(
        &self,
        revision: &str,
        parent: Option<&str>,
    ) -> Result<Vec<ChangedFile>, HistoryError> {
        (**self).changed_files(revision, parent)
    }

    fn tracked_files(&self) -> Result<Vec<RelPath>, HistoryError> {
        (**self).tracked_files()
    }
}

/// [`HistorySource`] that shells out to `git` in a repository root.
#[derive(Debug, Clone)]
pub struct GitHistory {
    root: RepoRoot,
}

impl GitHistory {
    /// Query the repository at `root`.
    pub fn new(root: RepoRoot) -> Self {
        Self { root }
    }

    /// Repository root.
    pub fn root(&self) -> &RepoRoot {
        &self.root
    }

    fn git(&self, args: &[&str]) -> Result<Output, HistoryError> {
        let _timer = Timer::start("git");
        tracing::debug!(?args, "git");
        Command::new("git")
            .args(args)
            .current_dir(self.root.path())
            .output()
            .map_err(HistoryError::SourceUnavailable)
    }

    /// Run git and return stdout, mapping a non-zero exit to `QueryFailed`.
    fn git_ok(&self, args: &[&str]) -> Result<Vec<u8>, HistoryError> {
        let output = self.git(args)?;
        if !output.status.success() {
            return Err(HistoryError::QueryFailed(diagnostic(&output)));
        }
        Ok(output.stdout)
    }

    fn blob_size(&self, spec: &str) -> Result<Result<u64, String>, HistoryError> {
        let output = self.git(&["cat-file", "-s", spec])?;
        if !output.status.success() {
            return Ok(Err(diagnostic(&output)));
        }
        let size_str = std::str::from_utf8(&output.stdout)
            .map_err(|_| HistoryError::InvalidUtf8)?
            .trim();
        size_str.parse::<u64>().map(Ok).map_err(|_| {
            HistoryError::QueryFailed(format!(
                "invalid size from git cat-file -s: {}",
                size_str
            ))
        })
    }
}

/// Git's complaint: stderr, else stdout, trimmed.
fn diagnostic(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if stdout.is_empty() {
        format!("git exited with {}", output.status)
    } else {
        stdout.to_string()
    }
}

/// Git's heuristic: a NUL byte in the first 8000 bytes.
pub(crate) fn looks_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

impl HistorySource for GitHistory {
    fn list_commits(
        &self,
        scope: &HistoryScope,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, HistoryError> {
        let limit_arg = format!("-n{}", limit.max(1));
        let format_arg = format!("--pretty=format:{}", LOG_FORMAT);
        let mut args = vec![
            "log",
            limit_arg.as_str(),
            "--date=iso8601-strict",
            format_arg.as_str(),
        ];

        let with_paths = match scope {
            HistoryScope::Repository => false,
            HistoryScope::File { path, follow } => {
                if *follow {
                    args.push("--follow");
                }
                args.extend(["--name-only", "--", path.as_str()]);
                true
            }
        };

        let stdout = self.git_ok(&args)?;
        let text = String::from_utf8_lossy(&stdout);
        let commits = parse_log_output(&text, with_paths)
            .map_err(|e| HistoryError::QueryFailed(e.to_string()))?;
        tracing::info!(scope = %scope.label(), count = commits.len(), "listed commits");
        Ok(commits)
    }

    fn diff(
        &self,
        revision: &str,
        path: &RelPath,
        parent: Option<&str>,
    ) -> Result<String, HistoryError> {
        let base = parent.unwrap_or(EMPTY_TREE);
        let stdout = self.git_ok(&[
            "diff",
            "--no-color",
            "--no-ext-diff",
            base,
            revision,
            "--",
            path.as_str(),
        ])?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn file_contents(&self, revision: &str, path: &RelPath) -> Result<String, HistoryError> {
        let spec = format!("{}:{}", revision, path.as_str());

        // Preflight size check to avoid OOM on huge blobs
        let size = match self.blob_size(&spec)? {
            Ok(size) => size,
            Err(message) => {
                return Err(HistoryError::NoContentAtRevision {
                    revision: revision.to_string(),
                    path: path.clone(),
                    message,
                })
            }
        };
        if size > MAX_FILE_SIZE {
            return Err(HistoryError::FileTooLarge {
                size,
                max: MAX_FILE_SIZE,
            });
        }

        let stdout = self.git_ok(&["cat-file", "blob", &spec])?;
        if looks_binary(&stdout) {
            return Err(HistoryError::BinaryContent);
        }
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn changed_files(
        &self,
        revision: &str,
        parent: Option<&str>,
    ) -> Result<Vec<ChangedFile>, HistoryError> {
        let base = parent.unwrap_or(EMPTY_TREE);
        let stdout = self.git_ok(&[
            "diff",
            "--name-status",
            "-z",
            "--find-renames",
            base,
            revision,
        ])?;
        let text = std::str::from_utf8(&stdout).map_err(|_| HistoryError::InvalidUtf8)?;
        Ok(parse_diff_name_status(text))
    }

    fn tracked_files(&self) -> Result<Vec<RelPath>, HistoryError> {
        let stdout = self.git_ok(&["ls-files", "-z"])?;
        let text = std::str::from_utf8(&stdout).map_err(|_| HistoryError::InvalidUtf8)?;
        Ok(text
            .split('\0')
            .filter(|p| !p.is_empty())
            .map(RelPath::new)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_sniff() {
        assert!(!looks_binary(b"plain text\n"));
        assert!(looks_binary(b"PNG\0\x01\x02"));
        let mut late = vec![b'a'; BINARY_SNIFF_LEN];
        late.push(0);
        assert!(!looks_binary(&late));
    }

    #[test]
    fn no_content_is_recoverable_kind() {
        let err = HistoryError::NoContentAtRevision {
            revision: "abc".into(),
            path: RelPath::new("f.txt"),
            message: "fatal: path 'f.txt' does not exist in 'abc'".into(),
        };
        assert!(err.is_no_content());
        assert!(!HistoryError::BinaryContent.is_no_content());
        assert!(err.to_string().starts_with("f.txt does not exist at abc"));
    }
}
