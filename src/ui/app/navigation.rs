use crate::config::LayoutKind;

use super::{App, CommitView, Focus};

impl App {
    /// Select the commit at `idx`, clamped to the list.
    ///
    /// If the new view cannot be built the previous selection is kept.
    pub fn select_index(&mut self, idx: usize) {
        let Some(last) = self.commits.len().checked_sub(1) else {
            return;
        };
        let idx = idx.min(last);
        if idx == self.sidebar.selected_idx && !matches!(self.view, CommitView::Empty) {
            return;
        }

        let previous = self.sidebar.selected_idx;
        self.sidebar.selected_idx = idx;
        if !self.refresh_view() {
            self.sidebar.selected_idx = previous;
        }
        self.ui.dirty = true;
    }

    /// Move to the next older commit.
    pub fn select_next(&mut self) {
        if self.sidebar.selected_idx + 1 < self.commits.len() {
            self.select_index(self.sidebar.selected_idx + 1);
        }
    }

    /// Move to the next newer commit.
    pub fn select_prev(&mut self) {
        if self.sidebar.selected_idx > 0 {
            self.select_index(self.sidebar.selected_idx - 1);
        }
    }

    /// Jump to the newest commit.
    pub fn select_first(&mut self) {
        self.select_index(0);
    }

    /// Jump to the oldest commit.
    pub fn select_last(&mut self) {
        self.select_index(self.commits.len().saturating_sub(1));
    }

    /// Toggle focus between the commit list and the detail pane.
    pub fn toggle_focus(&mut self) {
        let next = match self.focus {
            Focus::Commits => Focus::Detail,
            Focus::Detail => Focus::Commits,
        };
        self.set_focus(next);
    }

    /// Set focus. The detail layout has no commit list to focus.
    pub fn set_focus(&mut self, focus: Focus) {
        let focus = match self.layout {
            LayoutKind::Split => focus,
            LayoutKind::Detail => Focus::Detail,
        };
        if self.focus != focus {
            self.focus = focus;
            self.ui.dirty = true;
        }
    }

    /// Scroll the detail pane.
    pub fn scroll_view(&mut self, delta_y: isize, delta_x: isize) {
        let old_y = self.viewer.scroll_y;
        let old_x = self.viewer.scroll_x;

        if delta_y < 0 {
            self.viewer.scroll_y = self.viewer.scroll_y.saturating_sub(delta_y.unsigned_abs());
        } else {
            let max_scroll = self.view.row_count();
            if max_scroll == 0 {
                self.viewer.scroll_y = 0;
            } else {
                self.viewer.scroll_y =
                    (self.viewer.scroll_y + delta_y as usize).min(max_scroll - 1);
            }
        }

        if delta_x < 0 {
            self.viewer.scroll_x = self.viewer.scroll_x.saturating_sub(delta_x.unsigned_abs());
        } else {
            self.viewer.scroll_x += delta_x as usize;
        }

        if self.viewer.scroll_y != old_y || self.viewer.scroll_x != old_x {
            self.ui.dirty = true;
        }
    }

    /// Scroll to the first row.
    pub fn scroll_to_top(&mut self) {
        self.viewer.scroll_y = 0;
        self.ui.dirty = true;
    }

    /// Scroll to the last row.
    pub fn scroll_to_bottom(&mut self) {
        self.viewer.scroll_y = self.view.row_count().saturating_sub(1);
        self.ui.dirty = true;
    }

    /// Scroll to the next block of changed lines.
    pub fn next_change(&mut self) {
        let target = self
            .view
            .projection()
            .and_then(|p| p.next_change_row(self.viewer.scroll_y));
        if let Some(row) = target {
            self.viewer.scroll_y = row;
            self.ui.dirty = true;
        }
    }

    /// Scroll to the previous block of changed lines.
    pub fn prev_change(&mut self) {
        let target = self
            .view
            .projection()
            .and_then(|p| p.prev_change_row(self.viewer.scroll_y));
        if let Some(row) = target {
            self.viewer.scroll_y = row;
            self.ui.dirty = true;
        }
    }
}
