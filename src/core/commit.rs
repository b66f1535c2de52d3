//! Commit records and `git log` output parsing.

use chrono::{DateTime, FixedOffset};

use crate::core::RelPath;

/// Record separator emitted before each commit.
pub(crate) const RECORD_SEP: char = '\x1e';
/// Field separator between commit fields.
pub(crate) const FIELD_SEP: char = '\x1f';

/// `git log --pretty=format:` string matching [`parse_log_output`].
///
/// The trailing separator ends the body so `--name-only` output lands in a
/// field of its own.
pub(crate) const LOG_FORMAT: &str = "%x1e%H%x1f%P%x1f%an%x1f%ae%x1f%ad%x1f%s%x1f%b%x1f";

/// One revision in the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Full commit hash.
    pub oid: String,
    /// Parent hashes, first parent first. Empty for a root commit.
    pub parents: Vec<String>,
    /// Author name.
    pub author_name: String,
    /// Author email.
    pub author_email: String,
    /// Authoring time with its original UTC offset.
    pub authored_at: DateTime<FixedOffset>,
    /// First line of the message.
    pub title: String,
    /// Rest of the message, trailing whitespace trimmed.
    pub body: String,
    /// Path of the followed file at this revision, for single-file queries.
    pub path: Option<RelPath>,
}

impl CommitRecord {
    /// Abbreviated hash.
    pub fn short_oid(&self) -> &str {
        self.oid.get(..7).unwrap_or(&self.oid)
    }

    /// Parent to diff against.
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    /// True for a commit without parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// True for a commit with more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Author timestamp as RFC 3339, the format it was parsed from.
    pub fn authored_at_rfc3339(&self) -> String {
        self.authored_at.to_rfc3339()
    }
}

/// Error for a record that does not match [`LOG_FORMAT`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected git log record: {0}")]
pub struct LogParseError(pub String);

/// Parse output of `git log --date=iso8601-strict --pretty=format:LOG_FORMAT`.
///
/// With `with_paths`, the text after the last field is `--name-only` output and
/// its last non-empty line becomes [`CommitRecord::path`]. git prints no name
/// for some merges; those take the path of the nearest older commit.
pub fn parse_log_output(text: &str, with_paths: bool) -> Result<Vec<CommitRecord>, LogParseError> {
    let mut commits = Vec::new();

    for record in text.split(RECORD_SEP) {
        if record.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = record.split(FIELD_SEP).collect();
        if fields.len() < 7 {
            return Err(LogParseError(abbreviate(record)));
        }

        let authored_at = DateTime::parse_from_rfc3339(fields[4].trim())
            .map_err(|e| LogParseError(format!("{}: {}", fields[4].trim(), e)))?;

        let path = if with_paths {
            fields
                .get(7)
                .and_then(|names| names.lines().map(str::trim).filter(|l| !l.is_empty()).last())
                .map(RelPath::new)
        } else {
            None
        };

        commits.push(CommitRecord {
            oid: fields[0].trim().to_string(),
            parents: fields[1].split_whitespace().map(str::to_string).collect(),
            author_name: fields[2].to_string(),
            author_email: fields[3].to_string(),
            authored_at,
            title: fields[5].to_string(),
            body: fields[6].trim_end().to_string(),
            path,
        });
    }

    if with_paths {
        let mut older: Option<RelPath> = None;
        for commit in commits.iter_mut().rev() {
            if commit.path.is_some() {
                older.clone_from(&commit.path);
            } else {
                commit.path.clone_from(&older);
            }
        }
    }

    Ok(commits)
}

fn abbreviate(record: &str) -> String {
    let cleaned: String = record
        .chars()
        .map(|c| if c == FIELD_SEP { '|' } else { c })
        .take(80)
        .collect();
    cleaned.trim().to_string()
}
