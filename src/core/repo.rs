//! Repository discovery, target resolution and path types.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Maximum file size to load (50 MiB). Prevents OOM on huge blobs.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Errors raised while resolving what to show, before the UI starts.
///
/// The same errors are reused when the user redirects the view to another
/// file mid-session; there they become status messages instead of exits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SetupError {
    /// The repository directory given on the command line is missing.
    #[error("repository path does not exist: {}", .0.display())]
    RepositoryMissing(PathBuf),
    /// The directory exists but holds no `.git` entry.
    #[error("expected a version-control directory inside {}", .0.display())]
    NotARepository(PathBuf),
    /// Walking up from a file never reached a `.git` entry.
    #[error("could not locate a repository root in parent folders")]
    NoRepositoryRoot,
    /// The file path does not exist on disk.
    #[error("file does not exist: {}", .0.display())]
    FileMissing(PathBuf),
    /// A directory was given where a file was expected.
    #[error("path points to a directory; expected a file: {}", .0.display())]
    NotAFile(PathBuf),
    /// The file resolves outside of the repository root.
    #[error("{} is not inside repository {}", .path.display(), .root.display())]
    OutsideRepository {
        /// Resolved file path.
        path: PathBuf,
        /// Repository root.
        root: PathBuf,
    },
    /// Empty path input.
    #[error("no file path provided")]
    EmptyPath,
    /// The history query came back empty.
    #[error("No commits found for {0}. Is it tracked?")]
    NoCommits(String),
    /// I/O error while inspecting paths.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error when constructing a RelPath with an absolute path.
#[derive(Debug, Clone, thiserror::Error)]
#[error("path must be relative, got: {0}")]
pub struct InvalidRelPath(pub String);

/// Canonicalized path to a git repository root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRoot(PathBuf);

impl RepoRoot {
    /// Open `dir` as a repository root. The directory must contain `.git`
    /// (a directory, or a file for worktrees and submodules).
    #[must_use = "this returns a Result that should be checked"]
    pub fn open(dir: &Path) -> Result<Self, SetupError> {
        if !dir.exists() {
            return Err(SetupError::RepositoryMissing(dir.to_path_buf()));
        }
        if !dir.join(".git").exists() {
            return Err(SetupError::NotARepository(dir.to_path_buf()));
        }
        Ok(Self(dir.canonicalize()?))
    }

    /// Walk up from `start` until a directory containing `.git` is found.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use ghist::core::RepoRoot;
    /// use std::path::Path;
    ///
    /// let repo = RepoRoot::find_enclosing(Path::new("src")).expect("not in a git repo");
    /// println!("Repo at: {}", repo.path().display());
    /// ```
    #[must_use = "this returns a Result that should be checked"]
    pub fn find_enclosing(start: &Path) -> Result<Self, SetupError> {
        let start = start.canonicalize()?;
        for dir in start.ancestors() {
            if dir.join(".git").exists() {
                return Ok(Self(dir.to_path_buf()));
            }
        }
        Err(SetupError::NoRepositoryRoot)
    }

    /// Get the repository root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Get the repository root as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or("")
    }

    /// Express an absolute path as a repository-relative one.
    ///
    /// The path must exist; symlinks and `..` components are resolved first so
    /// nothing can escape the root.
    pub fn relativize(&self, absolute: &Path) -> Result<RelPath, SetupError> {
        let canonical = absolute.canonicalize()?;
        let rel = canonical
            .strip_prefix(&self.0)
            .map_err(|_| SetupError::OutsideRepository {
                path: canonical.clone(),
                root: self.0.clone(),
            })?;
        let parts: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Ok(RelPath::new(parts.join("/")))
    }
}

/// A repository-relative path using `/` separators. Never absolute.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct RelPath(String);

impl RelPath {
    /// Create a new RelPath, rejecting absolute paths.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghist::core::RelPath;
    ///
    /// let path = RelPath::try_new("src/main.rs").unwrap();
    /// assert_eq!(path.as_str(), "src/main.rs");
    /// assert!(RelPath::try_new("/absolute/path").is_err());
    /// ```
    #[must_use = "this returns a Result that should be checked"]
    pub fn try_new(path: impl Into<String>) -> Result<Self, InvalidRelPath> {
        let path = path.into();
        if path.starts_with('/') {
            return Err(InvalidRelPath(path));
        }
        Ok(Self(path))
    }

    /// Create a RelPath from trusted git output.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        debug_assert!(
            !path.starts_with('/'),
            "RelPath must not be absolute: {}",
            path
        );
        Self(path)
    }

    /// Get the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to an absolute path given a repo root.
    #[must_use]
    pub fn to_absolute(&self, root: &RepoRoot) -> PathBuf {
        root.path().join(&self.0)
    }

    /// Get the file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.0).extension().and_then(|s| s.to_str())
    }

    /// Get the file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        Path::new(&self.0)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.0)
    }
}

impl std::fmt::Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a history query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryScope {
    /// Every commit reachable from HEAD.
    Repository,
    /// Commits touching a single tracked file.
    File {
        /// Repository-relative path of the file at HEAD.
        path: RelPath,
        /// Follow the file across renames.
        follow: bool,
    },
}

impl HistoryScope {
    /// The tracked file, for file scope.
    pub fn file_path(&self) -> Option<&RelPath> {
        match self {
            Self::Repository => None,
            Self::File { path, .. } => Some(path),
        }
    }

    /// Short human label, used in titles and messages.
    pub fn label(&self) -> String {
        match self {
            Self::Repository => "repository".to_string(),
            Self::File { path, .. } => path.to_string(),
        }
    }
}

/// A resolved command-line target.
#[derive(Debug, Clone)]
pub struct Target {
    /// Repository root.
    pub repo: RepoRoot,
    /// Scope of the history query.
    pub scope: HistoryScope,
}

impl Target {
    /// Resolve a command-line path, relative to `cwd`, into a repository and scope.
    ///
    /// A directory must itself be a repository root; a file is looked up in the
    /// repository found in its parent folders.
    pub fn resolve(raw: &Path, cwd: &Path, follow: bool) -> Result<Self, SetupError> {
        let path = absolutize(raw, cwd);
        if path.is_dir() {
            let repo = RepoRoot::open(&path)?;
            return Ok(Self {
                repo,
                scope: HistoryScope::Repository,
            });
        }
        if !path.exists() {
            if raw.as_os_str().is_empty() || raw == Path::new(".") {
                return Err(SetupError::RepositoryMissing(path));
            }
            return Err(SetupError::FileMissing(path));
        }

        let parent = path.parent().unwrap_or(cwd);
        let repo = RepoRoot::find_enclosing(parent)?;
        let rel = repo.relativize(&path)?;
        Ok(Self {
            repo,
            scope: HistoryScope::File { path: rel, follow },
        })
    }
}

/// Resolve a user-typed file path for a mid-session file switch.
///
/// Tries the path as given (absolute, or relative to the launch directory), then
/// relative to the repository root, which is how completion candidates are spelled.
pub fn resolve_file_input(
    raw: &str,
    launch_cwd: &Path,
    repo: &RepoRoot,
) -> Result<RelPath, SetupError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SetupError::EmptyPath);
    }

    let mut path = absolutize(Path::new(raw), launch_cwd);
    if !path.exists() {
        let from_root = repo.path().join(raw);
        if from_root.exists() {
            path = from_root;
        } else {
            return Err(SetupError::FileMissing(path));
        }
    }
    if path.is_dir() {
        return Err(SetupError::NotAFile(path));
    }
    repo.relativize(&path)
}

fn absolutize(raw: &Path, cwd: &Path) -> PathBuf {
    if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        cwd.join(raw)
    }
}

/// Kind of change a commit made to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    /// File was newly added.
    Added,
    /// File was modified.
    Modified,
    /// File was deleted.
    Deleted,
    /// File was renamed or copied.
    Renamed,
}

impl FileChangeKind {
    /// Single-letter badge, as git prints it.
    pub fn badge(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
        }
    }
}

/// A file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Path to the file.
    pub path: RelPath,
    /// Type of change.
    pub kind: FileChangeKind,
    /// For renames, the original path.
    pub old_path: Option<RelPath>,
}

impl ChangedFile {
    /// Create a new changed file entry.
    pub fn new(path: RelPath, kind: FileChangeKind) -> Self {
        Self {
            path,
            kind,
            old_path: None,
        }
    }

    /// Create a renamed file entry.
    pub fn renamed(old_path: RelPath, new_path: RelPath) -> Self {
        Self {
            path: new_path,
            kind: FileChangeKind::Renamed,
            old_path: Some(old_path),
        }
    }
}

/// Parse `git diff --name-status -z` output.
pub(crate) fn parse_diff_name_status(text: &str) -> Vec<ChangedFile> {
    let mut files = Vec::new();
    let mut parts = text.split('\0');

    while let Some(status) = parts.next() {
        let status = status.trim_start_matches('\n');
        if status.is_empty() {
            continue;
        }

        let Some(path) = parts.next().filter(|p| !p.is_empty()) else {
            continue;
        };

        let kind = match status.chars().next() {
            Some('A') => FileChangeKind::Added,
            Some('D') => FileChangeKind::Deleted,
            Some('R') | Some('C') => {
                // Rename/copy: the next part is the new path
                if let Some(new_path) = parts.next() {
                    files.push(ChangedFile::renamed(
                        RelPath::new(path),
                        RelPath::new(new_path),
                    ));
                    continue;
                }
                FileChangeKind::Modified
            }
            _ => FileChangeKind::Modified,
        };

        files.push(ChangedFile::new(RelPath::new(path), kind));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}
