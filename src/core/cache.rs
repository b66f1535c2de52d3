//! Bounded memoization in front of a [`HistorySource`].

use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::core::{ChangedFile, CommitRecord, HistoryError, HistoryScope, HistorySource, RelPath};

/// Default number of memoized diffs.
pub const DIFF_CACHE_CAPACITY: usize = 128;
/// Default number of memoized file contents.
pub const CONTENTS_CACHE_CAPACITY: usize = 256;

fn capacity(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

type DiffKey = (String, RelPath, Option<String>);
type ContentsKey = (String, RelPath);

/// Wraps a source and memoizes diffs and file contents by revision.
///
/// Commit listings always hit the wrapped source. Errors are never cached.
pub struct CachedHistory<S> {
    inner: S,
    diffs: RefCell<LruCache<DiffKey, String>>,
    contents: RefCell<LruCache<ContentsKey, String>>,
}

impl<S: HistorySource> CachedHistory<S> {
    /// Wrap `inner` with the default capacities.
    pub fn new(inner: S) -> Self {
        Self::with_capacity(
            inner,
            capacity(DIFF_CACHE_CAPACITY),
            capacity(CONTENTS_CACHE_CAPACITY),
        )
    }

    /// Wrap `inner` with explicit capacities.
    pub fn with_capacity(inner: S, diffs: NonZeroUsize, contents: NonZeroUsize) -> Self {
        Self {
            inner,
            diffs: RefCell::new(LruCache::new(diffs)),
            contents: RefCell::new(LruCache::new(contents)),
        }
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of memoized diffs and file contents.
    pub fn cached_len(&self) -> (usize, usize) {
        (self.diffs.borrow().len(), self.contents.borrow().len())
    }
}

impl<S: HistorySource> HistorySource for CachedHistory<S> {
    fn list_commits(
        &self,
        scope: &HistoryScope,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, HistoryError> {
        self.inner.list_commits(scope, limit)
    }

    fn diff(
        &self,
        revision: &str,
        path: &RelPath,
        parent: Option<&str>,
    ) -> Result<String, HistoryError> {
        let key = (
            revision.to_string(),
            path.clone(),
            parent.map(str::to_string),
        );
        if let Some(hit) = self.diffs.borrow_mut().get(&key).cloned() {
            tracing::trace!(revision, path = %path, "diff cache hit");
            return Ok(hit);
        }
        let diff = self.inner.diff(revision, path, parent)?;
        self.diffs.borrow_mut().put(key, diff.clone());
        Ok(diff)
    }

    fn file_contents(&self, revision: &str, path: &RelPath) -> Result<String, HistoryError> {
        let key = (revision.to_string(), path.clone());
        if let Some(hit) = self.contents.borrow_mut().get(&key).cloned() {
            tracing::trace!(revision, path = %path, "contents cache hit");
            return Ok(hit);
        }
        let text = self.inner.file_contents(revision, path)?;
        self.contents.borrow_mut().put(key, text.clone());
        Ok(text)
    }

    fn changed_files(
        &self,
        revision: &str,
        parent: Option<&str>,
    ) -> Result<Vec<ChangedFile>, HistoryError> {
        self.inner.changed_files(revision, parent)
    }

    fn tracked_files(&self) -> Result<Vec<RelPath>, HistoryError> {
        self.inner.tracked_files()
    }
}
