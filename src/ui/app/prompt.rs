//! Jump-to-file prompt and file switching.

use crate::core::{resolve_file_input, HistoryScope, SetupError};

use super::{App, Mode};

/// Completions shown under the prompt.
pub const MAX_PROMPT_MATCHES: usize = 10;

impl App {
    /// Open the prompt, loading completion candidates.
    pub fn open_prompt(&mut self) {
        self.prompt.input.clear();
        self.prompt.selected = 0;
        self.prompt.candidates = match self.source.tracked_files() {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "could not list tracked files");
                Vec::new()
            }
        };
        self.update_prompt_matches();
        self.ui.mode = Mode::Prompt;
        self.ui.dirty = true;
    }

    /// Close the prompt without loading anything.
    pub fn cancel_prompt(&mut self) {
        self.ui.mode = Mode::Normal;
        self.prompt.input.clear();
        self.prompt.matches.clear();
        self.ui.dirty = true;
    }

    /// Append a character to the prompt input.
    pub fn prompt_push(&mut self, c: char) {
        self.prompt.input.push(c);
        self.update_prompt_matches();
    }

    /// Delete the last character of the prompt input.
    pub fn prompt_backspace(&mut self) {
        if self.prompt.input.pop().is_some() {
            self.update_prompt_matches();
        }
    }

    /// Move the completion highlight.
    pub fn prompt_move(&mut self, delta: isize) {
        let len = self.prompt.matches.len();
        if len == 0 {
            return;
        }
        let next = self.prompt.selected.saturating_add_signed(delta).min(len - 1);
        if next != self.prompt.selected {
            self.prompt.selected = next;
            self.ui.dirty = true;
        }
    }

    /// Replace the input with the highlighted completion.
    pub fn prompt_complete(&mut self) {
        if let Some(path) = self.prompt.selected_candidate() {
            self.prompt.input = path.to_string();
            self.update_prompt_matches();
        }
    }

    /// Load the typed path, or the highlighted completion when nothing is typed.
    pub fn submit_prompt(&mut self) {
        let raw = if self.prompt.input.trim().is_empty() {
            self.prompt
                .selected_candidate()
                .map(|p| p.to_string())
                .unwrap_or_default()
        } else {
            self.prompt.input.clone()
        };
        self.cancel_prompt();
        self.load_file(&raw);
    }

    /// Switch the history to the file named by `raw`.
    ///
    /// `raw` may be absolute, relative to the launch directory, or relative to
    /// the repository root. On any failure the current history stays as it is.
    pub fn load_file(&mut self, raw: &str) -> bool {
        let path = match resolve_file_input(raw, &self.launch_cwd, &self.repo) {
            Ok(path) => path,
            Err(e) => {
                self.set_error(e.to_string());
                return false;
            }
        };

        let scope = HistoryScope::File {
            path: path.clone(),
            follow: self.follow,
        };
        let commits = match self.source.list_commits(&scope, self.limit) {
            Ok(commits) => commits,
            Err(e) => {
                self.set_error(e.to_string());
                return false;
            }
        };
        let Some(first) = commits.first() else {
            self.set_error(SetupError::NoCommits(path.to_string()).to_string());
            return false;
        };
        let view = match self.build_view(&scope, first) {
            Ok(view) => view,
            Err(e) => {
                self.set_error(e.to_string());
                return false;
            }
        };

        tracing::info!(path = %path, commits = commits.len(), "switched file");
        self.scope = scope;
        self.commits = commits;
        self.view = view;
        self.sidebar.selected_idx = 0;
        self.sidebar.scroll = 0;
        self.viewer.scroll_y = 0;
        self.viewer.scroll_x = 0;
        self.set_status(format!("Loaded {path}"));
        true
    }

    fn update_prompt_matches(&mut self) {
        self.prompt.matches = self.prompt.matcher.rank(
            &self.prompt.input,
            &self.prompt.candidates,
            MAX_PROMPT_MATCHES,
        );
        self.prompt.selected = 0;
        self.ui.dirty = true;
    }
}
