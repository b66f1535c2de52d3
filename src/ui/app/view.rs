//! Building the detail view for a commit.

use crate::core::{
    inline_changes, project, CommitRecord, HistoryError, HistoryScope, HistorySource,
};
use crate::highlight::{LanguageId, LineHighlights};

use super::{App, CommitView, FileView};

impl App {
    /// Fetch and project everything the detail pane needs for `commit`.
    ///
    /// A file missing at the revision, binary or too large becomes a panel
    /// rather than an error; every other failure is returned.
    pub(crate) fn build_view(
        &self,
        scope: &HistoryScope,
        commit: &CommitRecord,
    ) -> Result<CommitView, HistoryError> {
        let _timer = crate::logging::Timer::start("build_view");
        let parent = commit.first_parent();

        let Some(scope_path) = scope.file_path() else {
            let files = self.source.changed_files(&commit.oid, parent)?;
            return Ok(CommitView::Repository { files });
        };
        let path = commit.path.clone().unwrap_or_else(|| scope_path.clone());

        let text = match self.source.file_contents(&commit.oid, &path) {
            Ok(text) => text,
            Err(HistoryError::NoContentAtRevision { message, .. }) => {
                tracing::debug!(oid = %commit.short_oid(), path = %path, "no content at revision");
                return Ok(CommitView::NoContent { path, message });
            }
            Err(HistoryError::BinaryContent) => return Ok(CommitView::Binary { path }),
            Err(HistoryError::FileTooLarge { size, .. }) => {
                return Ok(CommitView::TooLarge { path, size })
            }
            Err(e) => return Err(e),
        };

        let raw = self.source.diff(&commit.oid, &path, parent)?;
        let projection = project(&raw, &text);
        if projection.malformed_headers > 0 {
            tracing::debug!(
                oid = %commit.short_oid(),
                malformed = projection.malformed_headers,
                "diff had malformed hunk headers"
            );
        }
        let inline = inline_changes(&projection.lines);

        let highlights =
            LineHighlights::compute(&self.highlighter, LanguageId::from_path(&path), &text);

        Ok(CommitView::File(FileView {
            path,
            projection,
            inline,
            highlights,
        }))
    }

    /// Rebuild the view for the current selection.
    ///
    /// On failure the previous view stays and the error is shown.
    pub(crate) fn refresh_view(&mut self) -> bool {
        let Some(commit) = self.selected_commit() else {
            self.view = CommitView::Empty;
            return true;
        };
        match self.build_view(&self.scope, commit) {
            Ok(view) => {
                self.view = view;
                self.viewer.scroll_y = 0;
                self.viewer.scroll_x = 0;
                self.ui.dirty = true;
                true
            }
            Err(e) => {
                self.set_error(e.to_string());
                false
            }
        }
    }
}
