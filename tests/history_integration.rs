//! Integration tests against real git repositories.

use std::path::Path;

use ghist::core::{
    project, FileChangeKind, GitHistory, HistoryError, HistoryScope, HistorySource, LineTag,
    RelPath, RepoRoot, SetupError, Target,
};
use git2::{IndexAddOption, Oid, Repository, Signature};
use tempfile::TempDir;

const MAIN: &str = "main.txt";
const NOTES: &str = "notes.txt";

fn init_repo(path: &Path) -> Repository {
    let repo = Repository::init(path).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        config.set_str("user.name", "Test").unwrap();
    }
    repo
}

/// Stage everything in the work tree, deletions included, and commit it.
fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["."], IndexAddOption::DEFAULT, None)
        .unwrap();
    index.update_all(["."], None).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Three commits: create, replace the middle line, delete `main.txt`.
struct Fixture {
    dir: TempDir,
    created: Oid,
    edited: Oid,
    deleted: Oid,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path();
        let repo = init_repo(path);

        std::fs::write(path.join(MAIN), "a\nb\nc\n").unwrap();
        std::fs::write(path.join(NOTES), "x\n").unwrap();
        let created = commit_all(&repo, "create files");

        std::fs::write(path.join(MAIN), "a\nB\nc\n").unwrap();
        let edited = commit_all(&repo, "shout b\n\nThe middle line is louder now.\nSecond line.\n");

        std::fs::remove_file(path.join(MAIN)).unwrap();
        let deleted = commit_all(&repo, "drop main");

        Self {
            dir,
            created,
            edited,
            deleted,
        }
    }

    fn history(&self) -> GitHistory {
        GitHistory::new(RepoRoot::open(self.dir.path()).unwrap())
    }
}

fn file_scope(path: &str) -> HistoryScope {
    HistoryScope::File {
        path: RelPath::new(path),
        follow: true,
    }
}

#[test]
fn file_history_is_newest_first() {
    let fx = Fixture::new();
    let commits = fx.history().list_commits(&file_scope(MAIN), 256).unwrap();

    let oids: Vec<String> = commits.iter().map(|c| c.oid.clone()).collect();
    assert_eq!(
        oids,
        [
            fx.deleted.to_string(),
            fx.edited.to_string(),
            fx.created.to_string()
        ]
    );
    assert!(commits[2].is_root());
    assert_eq!(commits[1].first_parent(), Some(fx.created.to_string().as_str()));
    assert_eq!(commits[1].title, "shout b");
    assert_eq!(
        commits[1].body,
        "The middle line is louder now.\nSecond line."
    );
    assert_eq!(commits[1].author_email, "test@example.com");
    assert_eq!(commits[1].path, Some(RelPath::new(MAIN)));
}

#[test]
fn limit_caps_the_list() {
    let fx = Fixture::new();
    let commits = fx.history().list_commits(&file_scope(MAIN), 1).unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].oid, fx.deleted.to_string());

    let all = fx
        .history()
        .list_commits(&HistoryScope::Repository, 0)
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn repository_history_lists_every_commit() {
    let fx = Fixture::new();
    let commits = fx
        .history()
        .list_commits(&HistoryScope::Repository, 256)
        .unwrap();
    assert_eq!(commits.len(), 3);
    assert!(commits.iter().all(|c| c.path.is_none()));
}

#[test]
fn root_commit_projects_as_all_additions() {
    let fx = Fixture::new();
    let history = fx.history();
    let rev = fx.created.to_string();
    let path = RelPath::new(NOTES);

    let raw = history.diff(&rev, &path, None).unwrap();
    let text = history.file_contents(&rev, &path).unwrap();
    let view = project(&raw, &text);

    assert_eq!(view.summary(), "+1 -0");
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].tag, LineTag::Added);
    assert_eq!(view.lines[0].text, "x");
    assert_eq!(view.lines[0].new_line, Some(1));
}

#[test]
fn replaced_middle_line_end_to_end() {
    let fx = Fixture::new();
    let history = fx.history();
    let rev = fx.edited.to_string();
    let parent = fx.created.to_string();
    let path = RelPath::new(MAIN);

    let raw = history.diff(&rev, &path, Some(&parent)).unwrap();
    let text = history.file_contents(&rev, &path).unwrap();
    let view = project(&raw, &text);

    let rows: Vec<(LineTag, &str, Option<usize>, Option<usize>)> = view
        .lines
        .iter()
        .map(|l| (l.tag, l.text.as_str(), l.old_line, l.new_line))
        .collect();
    assert_eq!(
        rows,
        [
            (LineTag::Context, "a", Some(1), Some(1)),
            (LineTag::Removed, "b", Some(2), None),
            (LineTag::Added, "B", None, Some(2)),
            (LineTag::Context, "c", Some(3), Some(3)),
        ]
    );
    assert_eq!(view.summary(), "+1 -1");
}

#[test]
fn deleted_file_has_no_content() {
    let fx = Fixture::new();
    let err = fx
        .history()
        .file_contents(&fx.deleted.to_string(), &RelPath::new(MAIN))
        .unwrap_err();
    assert!(err.is_no_content(), "got {err:?}");
}

#[test]
fn bad_revision_is_a_query_failure() {
    let fx = Fixture::new();
    let err = fx
        .history()
        .diff("not-a-revision", &RelPath::new(MAIN), None)
        .unwrap_err();
    match err {
        HistoryError::QueryFailed(message) => assert!(!message.is_empty()),
        other => panic!("expected QueryFailed, got {other:?}"),
    }
}

#[test]
fn binary_blobs_are_rejected() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    std::fs::write(dir.path().join("blob.bin"), [0x89, b'P', b'N', b'G', 0, 1, 2]).unwrap();
    let oid = commit_all(&repo, "add blob");

    let history = GitHistory::new(RepoRoot::open(dir.path()).unwrap());
    let err = history
        .file_contents(&oid.to_string(), &RelPath::new("blob.bin"))
        .unwrap_err();
    assert!(matches!(err, HistoryError::BinaryContent), "got {err:?}");
}

#[test]
fn changed_files_per_commit() {
    let fx = Fixture::new();
    let history = fx.history();

    let root = history
        .changed_files(&fx.created.to_string(), None)
        .unwrap();
    let paths: Vec<&str> = root.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, [MAIN, NOTES]);
    assert!(root.iter().all(|f| f.kind == FileChangeKind::Added));

    let edited = history
        .changed_files(&fx.edited.to_string(), Some(&fx.created.to_string()))
        .unwrap();
    assert_eq!(edited.len(), 1);
    assert_eq!(edited[0].kind, FileChangeKind::Modified);

    let deleted = history
        .changed_files(&fx.deleted.to_string(), Some(&fx.edited.to_string()))
        .unwrap();
    assert_eq!(deleted[0].kind, FileChangeKind::Deleted);
}

#[test]
fn tracked_files_at_head() {
    let fx = Fixture::new();
    let files = fx.history().tracked_files().unwrap();
    assert_eq!(files, [RelPath::new(NOTES)]);
}

#[test]
fn follow_reports_path_per_revision() {
    let dir = TempDir::new().unwrap();
    let path = dir.path();
    let repo = init_repo(path);

    let body = "one\ntwo\nthree\nfour\nfive\nsix\n";
    std::fs::write(path.join("old.txt"), body).unwrap();
    commit_all(&repo, "add old");
    std::fs::rename(path.join("old.txt"), path.join("new.txt")).unwrap();
    commit_all(&repo, "rename");
    std::fs::write(path.join("new.txt"), format!("{body}seven\n")).unwrap();
    commit_all(&repo, "extend");

    let history = GitHistory::new(RepoRoot::open(path).unwrap());
    let followed = history.list_commits(&file_scope("new.txt"), 256).unwrap();
    let paths: Vec<Option<&str>> = followed
        .iter()
        .map(|c| c.path.as_ref().map(RelPath::as_str))
        .collect();
    assert_eq!(paths, [Some("new.txt"), Some("new.txt"), Some("old.txt")]);

    // The oldest revision is readable under its old name.
    let oldest = &followed[2];
    let text = history
        .file_contents(&oldest.oid, oldest.path.as_ref().unwrap())
        .unwrap();
    assert_eq!(text, body);

    let unfollowed = history
        .list_commits(
            &HistoryScope::File {
                path: RelPath::new("new.txt"),
                follow: false,
            },
            256,
        )
        .unwrap();
    assert_eq!(unfollowed.len(), 2);
}

#[test]
fn target_resolution_against_a_real_repository() {
    let fx = Fixture::new();
    let root = fx.dir.path();

    let repo_target = Target::resolve(Path::new("."), root, true).unwrap();
    assert_eq!(repo_target.scope, HistoryScope::Repository);

    let file_target = Target::resolve(Path::new(NOTES), root, false).unwrap();
    assert_eq!(
        file_target.scope,
        HistoryScope::File {
            path: RelPath::new(NOTES),
            follow: false
        }
    );

    let missing = Target::resolve(Path::new(MAIN), root, true).unwrap_err();
    assert!(matches!(missing, SetupError::FileMissing(_)));
    assert!(missing.to_string().starts_with("file does not exist"));
}
