//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust,ignore
//! use ghist::prelude::*;
//! ```

pub use crate::core::{
    project, AnnotatedLine, CachedHistory, CommitRecord, GitHistory, HistoryError, HistoryScope,
    HistorySource, LineTag, Projection, RelPath, RepoRoot, SetupError, Target,
};
