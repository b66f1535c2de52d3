//! Terminal UI using ratatui.

mod app;
mod input;
pub mod render;

pub use app::{
    App, AppOptions, CommitView, FileView, Focus, Mode, PromptState, SidebarState, UiState,
    ViewerState,
};
pub use input::handle_input;
pub use render::render;
