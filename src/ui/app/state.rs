use crate::core::{ChangedFile, InlineSpan, PathMatcher, Projection, RelPath};
use crate::highlight::LineHighlights;

/// Focus state for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Commit list.
    Commits,
    /// Detail pane.
    Detail,
}

/// UI mode (normal vs overlays).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal navigation mode.
    #[default]
    Normal,
    /// Viewing help overlay.
    Help,
    /// Typing a path in the jump-to-file prompt.
    Prompt,
}

/// Commit list navigation state.
#[derive(Debug, Default)]
pub struct SidebarState {
    /// Currently selected commit index (0 = newest).
    pub selected_idx: usize,
    /// Scroll offset (first visible commit).
    pub scroll: usize,
}

/// Detail pane scroll state.
#[derive(Debug, Default)]
pub struct ViewerState {
    /// First visible annotated row.
    pub scroll_y: usize,
    /// Horizontal offset in columns.
    pub scroll_x: usize,
}

/// Mode, messages and the redraw flag.
#[derive(Debug, Default)]
pub struct UiState {
    /// Current mode.
    pub mode: Mode,
    /// Transient error message.
    pub error: Option<String>,
    /// Transient status message.
    pub status: Option<String>,
    /// Whether the next loop iteration must redraw.
    pub dirty: bool,
}

/// Jump-to-file prompt state.
#[derive(Default)]
pub struct PromptState {
    /// Text typed so far.
    pub input: String,
    /// Tracked files offered for completion, loaded when the prompt opens.
    pub candidates: Vec<RelPath>,
    /// Indices into `candidates`, best match first.
    pub matches: Vec<usize>,
    /// Highlighted entry of `matches`.
    pub selected: usize,
    pub(crate) matcher: PathMatcher,
}

impl PromptState {
    /// Highlighted completion, if any.
    pub fn selected_candidate(&self) -> Option<&RelPath> {
        self.matches
            .get(self.selected)
            .and_then(|&i| self.candidates.get(i))
    }
}

/// A revision of the tracked file with the commit's changes projected onto it.
#[derive(Debug)]
pub struct FileView {
    /// Path of the file at this revision.
    pub path: RelPath,
    /// Annotated lines and change counts.
    pub projection: Projection,
    /// Word emphasis, parallel to `projection.lines`.
    pub inline: Vec<Option<Vec<InlineSpan>>>,
    /// Syntax spans, indexed by new-file line number minus one.
    pub highlights: LineHighlights,
}

/// What the detail pane shows for the selected commit.
#[derive(Debug, Default)]
pub enum CommitView {
    /// Nothing selected yet.
    #[default]
    Empty,
    /// The file at this revision with the commit's changes marked.
    File(FileView),
    /// The file did not exist at this revision.
    NoContent {
        /// Path looked up.
        path: RelPath,
        /// Git's diagnostic.
        message: String,
    },
    /// The file is binary at this revision.
    Binary {
        /// Path looked up.
        path: RelPath,
    },
    /// The blob is too large to load.
    TooLarge {
        /// Path looked up.
        path: RelPath,
        /// Blob size in bytes.
        size: u64,
    },
    /// Files changed by the commit, for repository scope.
    Repository {
        /// Changed files sorted by path.
        files: Vec<ChangedFile>,
    },
}

impl CommitView {
    /// Number of scrollable rows.
    pub fn row_count(&self) -> usize {
        match self {
            Self::File(view) => view.projection.row_count(),
            Self::Repository { files } => files.len(),
            Self::Empty | Self::NoContent { .. } | Self::Binary { .. } | Self::TooLarge { .. } => 0,
        }
    }

    /// The projection, when a file revision is shown.
    pub fn projection(&self) -> Option<&Projection> {
        match self {
            Self::File(view) => Some(&view.projection),
            _ => None,
        }
    }
}
