//! Core primitives for ghist (no TUI dependencies).

mod cache;
mod commit;
mod diff;
mod fuzzy;
mod history;
mod inline;
mod repo;

pub use cache::*;
pub use commit::*;
pub use diff::*;
pub use fuzzy::*;
pub use history::*;
pub use inline::*;
pub use repo::*;
