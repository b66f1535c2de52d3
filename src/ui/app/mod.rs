//! Application state and lifecycle.

use std::path::PathBuf;

use anyhow::Context;

use crate::config::{LayoutKind, DEFAULT_LIMIT};
use crate::core::{
    CachedHistory, CommitRecord, GitHistory, HistoryScope, HistorySource, SetupError, Target,
};
use crate::highlight::Highlighter;
use crate::theme::Theme;

mod navigation;
mod prompt;
mod state;
mod view;

pub use state::{
    CommitView, FileView, Focus, Mode, PromptState, SidebarState, UiState, ViewerState,
};

/// Startup options, resolved from flags and the settings file.
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Maximum commits per history query.
    pub limit: usize,
    /// Follow files across renames when switching files.
    pub follow: bool,
    /// Presentation layout.
    pub layout: LayoutKind,
    /// Color theme.
    pub theme: Theme,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            follow: true,
            layout: LayoutKind::default(),
            theme: Theme::default(),
        }
    }
}

/// Application state.
pub struct App {
    source: Box<dyn HistorySource>,
    /// Repository root.
    pub repo: crate::core::RepoRoot,
    /// Directory the program was started from; typed paths resolve against it.
    pub launch_cwd: PathBuf,
    /// What the commit list covers.
    pub scope: HistoryScope,
    /// Commits, newest first.
    pub commits: Vec<CommitRecord>,
    /// Maximum commits per history query.
    pub limit: usize,
    /// Follow renames for files opened from the prompt.
    pub follow: bool,
    /// Detail pane content for the selected commit.
    pub view: CommitView,
    /// Presentation layout.
    pub layout: LayoutKind,
    /// Commit list state.
    pub sidebar: SidebarState,
    /// Current focus.
    pub focus: Focus,
    /// Detail pane scroll state.
    pub viewer: ViewerState,
    /// UI state (mode, messages).
    pub ui: UiState,
    /// Jump-to-file prompt.
    pub prompt: PromptState,
    /// Current theme.
    pub theme: Theme,
    /// Should the app quit?
    pub should_quit: bool,
    /// Quit was requested with Ctrl+C.
    pub interrupted: bool,

    highlighter: Highlighter,
}

impl App {
    /// Query git for `target` and build the initial view.
    ///
    /// Fails when git cannot be run, the query fails or comes back empty.
    pub fn new(target: Target, launch_cwd: PathBuf, options: AppOptions) -> anyhow::Result<Self> {
        let source = CachedHistory::new(GitHistory::new(target.repo.clone()));
        let commits = source
            .list_commits(&target.scope, options.limit)
            .with_context(|| format!("failed to list commits for {}", target.scope.label()))?;
        if commits.is_empty() {
            return Err(SetupError::NoCommits(target.scope.label()).into());
        }
        tracing::info!(
            scope = %target.scope.label(),
            commits = commits.len(),
            "loaded history"
        );

        Ok(Self::with_source(
            Box::new(source),
            target,
            launch_cwd,
            commits,
            options,
        ))
    }

    /// Build the app over an already listed history.
    pub fn with_source(
        source: Box<dyn HistorySource>,
        target: Target,
        launch_cwd: PathBuf,
        commits: Vec<CommitRecord>,
        options: AppOptions,
    ) -> Self {
        let focus = match options.layout {
            LayoutKind::Split => Focus::Commits,
            LayoutKind::Detail => Focus::Detail,
        };
        let mut app = Self {
            source,
            repo: target.repo,
            launch_cwd,
            scope: target.scope,
            commits,
            limit: options.limit.max(1),
            follow: options.follow,
            view: CommitView::Empty,
            layout: options.layout,
            sidebar: SidebarState::default(),
            focus,
            viewer: ViewerState::default(),
            ui: UiState {
                dirty: true,
                ..UiState::default()
            },
            prompt: PromptState::default(),
            theme: options.theme,
            should_quit: false,
            interrupted: false,
            highlighter: Highlighter::new(),
        };
        app.refresh_view();
        app
    }

    /// The selected commit.
    pub fn selected_commit(&self) -> Option<&CommitRecord> {
        self.commits.get(self.sidebar.selected_idx)
    }

    /// 1-based position of the selection counted from the oldest commit.
    pub fn position(&self) -> usize {
        self.commits.len().saturating_sub(self.sidebar.selected_idx)
    }

    /// Set an error message (clears status).
    pub fn set_error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!(error = %msg, "ui error");
        self.ui.error = Some(msg);
        self.ui.status = None;
        self.ui.dirty = true;
    }

    /// Set a status message (clears error).
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.ui.status = Some(msg.into());
        self.ui.error = None;
        self.ui.dirty = true;
    }

    /// Drop transient messages.
    pub fn clear_messages(&mut self) {
        if self.ui.error.is_some() || self.ui.status.is_some() {
            self.ui.error = None;
            self.ui.status = None;
            self.ui.dirty = true;
        }
    }

    /// Mark UI as needing redraw.
    pub fn mark_dirty(&mut self) {
        self.ui.dirty = true;
    }

    /// Clear dirty flag after drawing.
    pub fn clear_dirty(&mut self) {
        self.ui.dirty = false;
    }

    /// Quit normally.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Quit because of Ctrl+C.
    pub fn interrupt(&mut self) {
        self.interrupted = true;
        self.should_quit = true;
    }

    /// Open the help overlay, or close it.
    pub fn toggle_help(&mut self) {
        self.ui.mode = if self.ui.mode == Mode::Help {
            Mode::Normal
        } else {
            Mode::Help
        };
        self.ui.dirty = true;
    }
}
