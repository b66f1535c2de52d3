//! Navigator behavior over an in-memory history.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::DateTime;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ghist::config::LayoutKind;
use ghist::core::{
    ChangedFile, CommitRecord, FileChangeKind, HistoryError, HistoryScope, HistorySource,
    LineTag, RelPath, RepoRoot, Target,
};
use ghist::ui::{handle_input, render, App, AppOptions, CommitView, Focus, Mode};
use ghist::theme::Theme;
use ratatui::{backend::TestBackend, style::Color, Terminal};
use tempfile::TempDir;

const MAIN: &str = "main.txt";
const OTHER: &str = "other.txt";

#[derive(Default)]
struct Calls {
    diffs: Cell<usize>,
    contents: Cell<usize>,
}

/// History served from maps. A missing file is `NoContentAtRevision`, a
/// missing diff is `QueryFailed`.
#[derive(Default)]
struct FakeHistory {
    calls: Rc<Calls>,
    files: HashMap<(String, String), String>,
    diffs: HashMap<String, String>,
    histories: HashMap<String, Vec<CommitRecord>>,
    changed: Vec<ChangedFile>,
    tracked: Vec<RelPath>,
}

impl FakeHistory {
    fn file(mut self, oid: &str, path: &str, text: &str) -> Self {
        self.files
            .insert((oid.to_string(), path.to_string()), text.to_string());
        self
    }

    fn diff(mut self, oid: &str, raw: &str) -> Self {
        self.diffs.insert(oid.to_string(), raw.to_string());
        self
    }
}

impl HistorySource for FakeHistory {
    fn list_commits(
        &self,
        scope: &HistoryScope,
        limit: usize,
    ) -> Result<Vec<CommitRecord>, HistoryError> {
        let key = scope.file_path().map(|p| p.to_string()).unwrap_or_default();
        Ok(self
            .histories
            .get(&key)
            .map(|c| c.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn diff(
        &self,
        revision: &str,
        _path: &RelPath,
        _parent: Option<&str>,
    ) -> Result<String, HistoryError> {
        self.calls.diffs.set(self.calls.diffs.get() + 1);
        self.diffs
            .get(revision)
            .cloned()
            .ok_or_else(|| HistoryError::QueryFailed(format!("bad revision '{revision}'")))
    }

    fn file_contents(&self, revision: &str, path: &RelPath) -> Result<String, HistoryError> {
        self.calls.contents.set(self.calls.contents.get() + 1);
        self.files
            .get(&(revision.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| HistoryError::NoContentAtRevision {
                revision: revision.to_string(),
                path: path.clone(),
                message: format!("path '{path}' does not exist in '{revision}'"),
            })
    }

    fn changed_files(
        &self,
        _revision: &str,
        _parent: Option<&str>,
    ) -> Result<Vec<ChangedFile>, HistoryError> {
        Ok(self.changed.clone())
    }

    fn tracked_files(&self) -> Result<Vec<RelPath>, HistoryError> {
        Ok(self.tracked.clone())
    }
}

fn commit(oid: &str, parent: Option<&str>, title: &str) -> CommitRecord {
    CommitRecord {
        oid: oid.to_string(),
        parents: parent.into_iter().map(str::to_string).collect(),
        author_name: "Test".to_string(),
        author_email: "test@example.com".to_string(),
        authored_at: DateTime::parse_from_rfc3339("2024-03-01T12:30:00+02:00").unwrap(),
        title: title.to_string(),
        body: String::new(),
        path: None,
    }
}

/// `main.txt`: created in c1, middle line replaced in c2, deleted in c3.
fn main_history() -> (FakeHistory, Vec<CommitRecord>) {
    let fake = FakeHistory::default()
        .file("c1", MAIN, "a\nb\nc\n")
        .file("c2", MAIN, "a\nB\nc\n")
        .diff("c1", "@@ -0,0 +1,3 @@\n+a\n+b\n+c\n")
        .diff("c2", "@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n");
    let commits = vec![
        commit("c3", Some("c2"), "delete main"),
        commit("c2", Some("c1"), "shout b"),
        commit("c1", None, "create main"),
    ];
    (fake, commits)
}

struct Harness {
    _dir: TempDir,
    app: App,
    calls: Rc<Calls>,
}

fn harness(fake: FakeHistory, commits: Vec<CommitRecord>, scope: HistoryScope) -> Harness {
    harness_with(fake, commits, scope, AppOptions::default())
}

fn harness_with(
    mut fake: FakeHistory,
    commits: Vec<CommitRecord>,
    scope: HistoryScope,
    options: AppOptions,
) -> Harness {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();
    std::fs::write(dir.path().join(OTHER), "hello\n").unwrap();
    std::fs::write(dir.path().join("untracked.txt"), "nothing\n").unwrap();

    fake.histories
        .insert(OTHER.to_string(), vec![commit("o1", None, "add other")]);
    fake = fake
        .file("o1", OTHER, "hello\n")
        .diff("o1", "@@ -0,0 +1 @@\n+hello\n");

    let calls = Rc::clone(&fake.calls);
    let repo = RepoRoot::open(dir.path()).unwrap();
    let app = App::with_source(
        Box::new(fake),
        Target { repo, scope },
        dir.path().to_path_buf(),
        commits,
        options,
    );
    Harness {
        _dir: dir,
        app,
        calls,
    }
}

fn main_scope() -> HistoryScope {
    HistoryScope::File {
        path: RelPath::new(MAIN),
        follow: true,
    }
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn screen(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal.draw(|frame| render(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn missing_file_shows_notice_without_projecting() {
    let (fake, commits) = main_history();
    let h = harness(fake, commits, main_scope());

    match &h.app.view {
        CommitView::NoContent { path, message } => {
            assert_eq!(path.as_str(), MAIN);
            assert!(message.contains("does not exist"));
        }
        other => panic!("expected NoContent, got {other:?}"),
    }
    assert_eq!(h.calls.contents.get(), 1);
    assert_eq!(h.calls.diffs.get(), 0);
    assert!(h.app.view.projection().is_none());
}

#[test]
fn stepping_projects_each_revision() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());

    h.app.select_next();
    assert_eq!(h.app.sidebar.selected_idx, 1);
    assert_eq!(h.app.position(), 2);
    let projection = h.app.view.projection().unwrap();
    assert_eq!(projection.summary(), "+1 -1");
    let tags: Vec<LineTag> = projection.lines.iter().map(|l| l.tag).collect();
    assert_eq!(
        tags,
        [
            LineTag::Context,
            LineTag::Removed,
            LineTag::Added,
            LineTag::Context
        ]
    );

    h.app.select_next();
    let projection = h.app.view.projection().unwrap();
    assert_eq!(projection.summary(), "+3 -0");
    assert!(projection.lines.iter().all(|l| l.tag == LineTag::Added));
}

#[test]
fn selection_is_clamped() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());

    h.app.select_prev();
    assert_eq!(h.app.sidebar.selected_idx, 0);

    h.app.select_index(99);
    assert_eq!(h.app.sidebar.selected_idx, 2);
    h.app.select_next();
    assert_eq!(h.app.sidebar.selected_idx, 2);

    h.app.select_first();
    assert_eq!(h.app.sidebar.selected_idx, 0);
    h.app.select_last();
    assert_eq!(h.app.sidebar.selected_idx, 2);
}

#[test]
fn failed_fetch_keeps_previous_selection_and_view() {
    let (fake, _) = main_history();
    let fake = fake.file("bad", MAIN, "a\nb\nc\n");
    let commits = vec![
        commit("c2", Some("c1"), "shout b"),
        commit("bad", Some("c1"), "unreadable"),
        commit("c1", None, "create main"),
    ];
    let mut h = harness(fake, commits, main_scope());
    let before = h.app.view.projection().cloned().unwrap();

    h.app.select_next();

    assert_eq!(h.app.sidebar.selected_idx, 0);
    assert_eq!(h.app.view.projection(), Some(&before));
    let error = h.app.ui.error.clone().unwrap();
    assert!(error.contains("bad revision"), "{error}");
}

#[test]
fn revisiting_a_commit_is_idempotent() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());

    h.app.select_index(1);
    let first = h.app.view.projection().cloned().unwrap();
    let diffs = h.calls.diffs.get();

    // Same selection: nothing is fetched again.
    h.app.select_index(1);
    assert_eq!(h.calls.diffs.get(), diffs);

    h.app.select_next();
    h.app.select_prev();
    assert_eq!(h.app.view.projection(), Some(&first));
}

#[test]
fn scrolling_is_bounded_and_resets_on_commit_change() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());
    h.app.select_index(1);

    h.app.scroll_view(10, 3);
    assert_eq!(h.app.viewer.scroll_y, 3);
    assert_eq!(h.app.viewer.scroll_x, 3);
    h.app.scroll_view(-1, -5);
    assert_eq!(h.app.viewer.scroll_y, 2);
    assert_eq!(h.app.viewer.scroll_x, 0);

    h.app.scroll_to_top();
    h.app.next_change();
    assert_eq!(h.app.viewer.scroll_y, 1);

    h.app.select_next();
    assert_eq!(h.app.viewer.scroll_y, 0);
}

#[test]
fn load_file_replaces_history() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());
    h.app.select_index(2);

    assert!(h.app.load_file(OTHER));

    assert_eq!(h.app.ui.status.as_deref(), Some("Loaded other.txt"));
    assert_eq!(h.app.commits.len(), 1);
    assert_eq!(h.app.sidebar.selected_idx, 0);
    assert_eq!(
        h.app.scope,
        HistoryScope::File {
            path: RelPath::new(OTHER),
            follow: true
        }
    );
    assert_eq!(h.app.view.projection().unwrap().summary(), "+1 -0");
}

#[test]
fn load_file_failures_leave_state_untouched() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());

    assert!(!h.app.load_file("missing.txt"));
    assert!(h
        .app
        .ui
        .error
        .as_deref()
        .unwrap()
        .starts_with("file does not exist"));

    assert!(!h.app.load_file("untracked.txt"));
    assert_eq!(
        h.app.ui.error.as_deref(),
        Some("No commits found for untracked.txt. Is it tracked?")
    );

    assert!(!h.app.load_file("   "));
    assert_eq!(h.app.ui.error.as_deref(), Some("no file path provided"));

    assert!(!h.app.load_file(".git"));

    assert_eq!(h.app.commits.len(), 3);
    assert_eq!(h.app.scope, main_scope());
    assert!(matches!(h.app.view, CommitView::NoContent { .. }));
}

#[test]
fn load_file_rejects_paths_outside_the_repository() {
    let outside = TempDir::new().unwrap();
    let stray = outside.path().join("stray.txt");
    std::fs::write(&stray, "x\n").unwrap();

    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());
    assert!(!h.app.load_file(stray.to_str().unwrap()));
    assert!(h
        .app
        .ui
        .error
        .as_deref()
        .unwrap()
        .contains("is not inside repository"));
}

#[test]
fn repository_scope_lists_changed_files() {
    let mut fake = FakeHistory::default();
    fake.changed = vec![
        ChangedFile::new(RelPath::new("a.rs"), FileChangeKind::Added),
        ChangedFile::renamed(RelPath::new("old.rs"), RelPath::new("new.rs")),
    ];
    let commits = vec![commit("r2", Some("r1"), "second"), commit("r1", None, "first")];
    let h = harness(fake, commits, HistoryScope::Repository);

    match &h.app.view {
        CommitView::Repository { files } => assert_eq!(files.len(), 2),
        other => panic!("expected Repository, got {other:?}"),
    }
    assert_eq!(h.calls.diffs.get(), 0);
}

#[test]
fn keys_drive_navigation_and_exit() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());
    assert_eq!(h.app.focus, Focus::Commits);

    handle_input(&mut h.app, key(KeyCode::Left));
    assert_eq!(h.app.sidebar.selected_idx, 1);
    handle_input(&mut h.app, key(KeyCode::Right));
    assert_eq!(h.app.sidebar.selected_idx, 0);
    handle_input(&mut h.app, key(KeyCode::Char('j')));
    assert_eq!(h.app.sidebar.selected_idx, 1);

    handle_input(&mut h.app, key(KeyCode::Tab));
    assert_eq!(h.app.focus, Focus::Detail);
    handle_input(&mut h.app, key(KeyCode::Char('j')));
    assert_eq!(h.app.sidebar.selected_idx, 1);
    assert_eq!(h.app.viewer.scroll_y, 1);

    handle_input(&mut h.app, key(KeyCode::Char('?')));
    assert_eq!(h.app.ui.mode, Mode::Help);
    handle_input(&mut h.app, key(KeyCode::Esc));
    assert_eq!(h.app.ui.mode, Mode::Normal);

    handle_input(&mut h.app, key(KeyCode::Char('q')));
    assert!(h.app.should_quit);
    assert!(!h.app.interrupted);
}

#[test]
fn ctrl_c_interrupts() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());
    handle_input(
        &mut h.app,
        Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
    );
    assert!(h.app.should_quit);
    assert!(h.app.interrupted);
}

#[test]
fn prompt_completes_and_loads() {
    let (mut fake, commits) = main_history();
    fake.tracked = vec![RelPath::new(MAIN), RelPath::new(OTHER)];
    let mut h = harness(fake, commits, main_scope());

    handle_input(&mut h.app, key(KeyCode::Char('f')));
    assert_eq!(h.app.ui.mode, Mode::Prompt);
    assert_eq!(h.app.prompt.matches.len(), 2);

    for c in "oth".chars() {
        handle_input(&mut h.app, key(KeyCode::Char(c)));
    }
    assert_eq!(
        h.app.prompt.selected_candidate().map(RelPath::as_str),
        Some(OTHER)
    );

    handle_input(&mut h.app, key(KeyCode::Tab));
    assert_eq!(h.app.prompt.input, OTHER);

    handle_input(&mut h.app, key(KeyCode::Enter));
    assert_eq!(h.app.ui.mode, Mode::Normal);
    assert_eq!(h.app.ui.status.as_deref(), Some("Loaded other.txt"));
    assert_eq!(h.app.commits[0].oid, "o1");
}

#[test]
fn prompt_escape_keeps_history() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());

    handle_input(&mut h.app, key(KeyCode::Char('f')));
    handle_input(&mut h.app, key(KeyCode::Char('q')));
    assert!(!h.app.should_quit);
    handle_input(&mut h.app, key(KeyCode::Esc));

    assert_eq!(h.app.ui.mode, Mode::Normal);
    assert_eq!(h.app.commits.len(), 3);
}

#[test]
fn detail_layout_keeps_focus_on_detail() {
    let (fake, commits) = main_history();
    let options = AppOptions {
        layout: LayoutKind::Detail,
        ..AppOptions::default()
    };
    let mut h = harness_with(fake, commits, main_scope(), options);

    assert_eq!(h.app.focus, Focus::Detail);
    h.app.toggle_focus();
    assert_eq!(h.app.focus, Focus::Detail);

    let text = screen(&mut h.app);
    assert!(!text.contains("Commits (3)"));
    assert!(text.contains("Unable to load file at this revision:"));
}

#[test]
fn split_layout_renders_header_and_file() {
    let (fake, commits) = main_history();
    let mut h = harness(fake, commits, main_scope());
    h.app.select_index(1);

    let text = screen(&mut h.app);
    assert!(text.contains("Commits (3)"));
    assert!(text.contains("Edited main.txt (+1, -1)"));
    assert!(text.contains("position  2/3"));
    assert!(text.contains("test@example.com"));
    assert!(text.contains("2024-03-01 12:30:00"));
    assert!(text.contains("shout b"));
}

#[test]
fn followed_file_is_read_under_its_path_at_each_revision() {
    let renamed = |oid: &str, parent: Option<&str>, title: &str, path: &str| CommitRecord {
        path: Some(RelPath::new(path)),
        ..commit(oid, parent, title)
    };
    let fake = FakeHistory::default()
        .file("r1", "old.txt", "one\n")
        .file("r2", "new.txt", "one\ntwo\n")
        .diff("r1", "@@ -0,0 +1 @@\n+one\n")
        .diff("r2", "@@ -0,0 +1,2 @@\n+one\n+two\n");
    let commits = vec![
        renamed("r2", Some("r1"), "rename and extend", "new.txt"),
        renamed("r1", None, "create", "old.txt"),
    ];
    let scope = HistoryScope::File {
        path: RelPath::new("new.txt"),
        follow: true,
    };
    let mut h = harness(fake, commits, scope);

    let CommitView::File(view) = &h.app.view else {
        panic!("expected file view, got {:?}", h.app.view);
    };
    assert_eq!(view.path.as_str(), "new.txt");
    assert_eq!(view.projection.lines.len(), 2);

    h.app.select_next();
    assert_eq!(h.app.sidebar.selected_idx, 1);
    let CommitView::File(view) = &h.app.view else {
        panic!("expected file view, got {:?}", h.app.view);
    };
    assert_eq!(view.path.as_str(), "old.txt");
    let texts: Vec<&str> = view.projection.lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["one"]);
    assert!(h.app.ui.error.is_none());
}

#[test]
fn focused_pane_border_uses_the_active_color() {
    let active = Color::Rgb(1, 2, 3);
    let mut theme = Theme::default();
    theme.border_active = active;
    let (fake, commits) = main_history();
    let options = AppOptions {
        theme,
        ..AppOptions::default()
    };
    let mut h = harness_with(fake, commits, main_scope(), options);

    // Top bar is row 0; the commit list starts at column 0, the detail pane at 40.
    let corner_colors = |app: &mut App| {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (buffer[(0, 1)].fg, buffer[(40, 1)].fg)
    };

    assert_eq!(h.app.focus, Focus::Commits);
    let (commits_fg, detail_fg) = corner_colors(&mut h.app);
    assert_eq!(commits_fg, active);
    assert_eq!(detail_fg, h.app.theme.border_dim);

    h.app.toggle_focus();
    let (commits_fg, detail_fg) = corner_colors(&mut h.app);
    assert_eq!(commits_fg, h.app.theme.border_dim);
    assert_eq!(detail_fg, active);
}

#[test]
fn options_default_to_split_layout() {
    let options = AppOptions::default();
    assert_eq!(options.layout, LayoutKind::Split);
    assert!(options.follow);
}
