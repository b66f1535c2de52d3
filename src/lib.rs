//! ghist - a terminal viewer for the git history of a file or repository.
//!
//! Steps through the commits touching a file and shows each revision of the
//! file in full, with the commit's additions and removals marked in place.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ghist::prelude::*;
//!
//! let target = Target::resolve(Path::new("src/main.rs"), &cwd, true)?;
//! let history = GitHistory::new(target.repo.clone());
//! let commits = history.list_commits(&target.scope, 50)?;
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod core;
pub mod highlight;
pub mod logging;
pub mod prelude;
pub mod theme;
pub mod ui;
