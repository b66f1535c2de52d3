//! Unified diff parsing and projection onto full file content.
//!
//! Git reports a commit's change to a file as hunks. The viewer instead shows the
//! whole file as it was at that revision, with added lines marked in place and
//! removed lines reinserted at the position they were cut from. [`project`] does
//! that transformation.

use std::collections::{BTreeMap, BTreeSet};

use crate::logging::Timer;

/// Classification of a diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTag {
    /// Unchanged line.
    Context,
    /// Line introduced by the revision.
    Added,
    /// Line dropped by the revision.
    Removed,
}

impl LineTag {
    /// Gutter marker character.
    pub fn marker(self) -> char {
        match self {
            Self::Context => ' ',
            Self::Added => '+',
            Self::Removed => '-',
        }
    }
}

/// One body line of a hunk, marker stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    /// Kind of edit.
    pub tag: LineTag,
    /// Line text without the leading marker.
    pub text: String,
}

/// Parsed `@@ -a,b +c,d @@ section` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkHeader {
    /// First old-file line covered by the hunk.
    pub old_start: usize,
    /// Old-side line count, when the header spells it out.
    pub old_count: Option<usize>,
    /// First new-file line covered by the hunk.
    pub new_start: usize,
    /// New-side line count, when the header spells it out.
    pub new_count: Option<usize>,
    /// Text after the closing `@@` (usually the enclosing function).
    pub section: String,
}

/// A hunk of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// First old-file line covered by the hunk.
    pub old_start: usize,
    /// First new-file line covered by the hunk.
    pub new_start: usize,
    /// Old-side count as given in the header.
    pub old_count: Option<usize>,
    /// New-side count as given in the header.
    pub new_count: Option<usize>,
    /// Text after the closing `@@`.
    pub section: String,
    /// Body lines in diff order.
    pub edits: Vec<LineEdit>,
    /// The header could not be parsed; line numbers fell back to 1.
    pub malformed: bool,
}

impl DiffHunk {
    fn from_header(header: HunkHeader) -> Self {
        Self {
            old_start: header.old_start,
            new_start: header.new_start,
            old_count: header.old_count,
            new_count: header.new_count,
            section: header.section,
            edits: Vec::new(),
            malformed: false,
        }
    }

    fn fallback() -> Self {
        Self {
            old_start: 1,
            new_start: 1,
            old_count: None,
            new_count: None,
            section: String::new(),
            edits: Vec::new(),
            malformed: true,
        }
    }

    /// Number of added lines in this hunk.
    pub fn additions(&self) -> usize {
        self.edits.iter().filter(|e| e.tag == LineTag::Added).count()
    }

    /// Number of removed lines in this hunk.
    pub fn deletions(&self) -> usize {
        self.edits
            .iter()
            .filter(|e| e.tag == LineTag::Removed)
            .count()
    }
}

/// Parse a hunk header line.
///
/// Accepts `@@ -a,b +c,d @@` and the short `@@ -a +c @@` form. Returns `None`
/// for anything else.
///
/// # Examples
///
/// ```
/// use ghist::core::parse_hunk_header;
///
/// let h = parse_hunk_header("@@ -10,3 +12 @@ fn main() {").unwrap();
/// assert_eq!((h.old_start, h.old_count), (10, Some(3)));
/// assert_eq!((h.new_start, h.new_count), (12, None));
/// assert_eq!(h.section, "fn main() {");
/// ```
pub fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let rest = line.strip_prefix("@@ ")?;
    let close = rest.find(" @@")?;
    let ranges = &rest[..close];
    let section = rest[close + 3..].trim().to_string();

    let mut parts = ranges.split_whitespace();
    let (old_start, old_count) = parse_range(parts.next()?.strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(parts.next()?.strip_prefix('+')?)?;
    if parts.next().is_some() {
        return None;
    }

    Some(HunkHeader {
        old_start,
        old_count,
        new_start,
        new_count,
        section,
    })
}

fn parse_range(range: &str) -> Option<(usize, Option<usize>)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, Some(count.parse().ok()?))),
        None => Some((range.parse().ok()?, None)),
    }
}

fn is_metadata(line: &str) -> bool {
    line.starts_with("diff ")
        || line.starts_with("index")
        || line.starts_with("---")
        || line.starts_with("+++")
}

/// Remaining body lines a well-formed header announced.
#[derive(Debug, Clone, Copy)]
struct BodyBudget {
    old: usize,
    new: usize,
}

impl BodyBudget {
    fn open(&self) -> bool {
        self.old > 0 || self.new > 0
    }
}

/// Split raw diff text into hunks.
///
/// Never fails: unparseable headers become hunks starting at line 1 with
/// [`DiffHunk::malformed`] set, and unrecognized lines are dropped.
pub fn parse_hunks(raw: &str) -> Vec<DiffHunk> {
    let mut hunks: Vec<DiffHunk> = Vec::new();
    let mut budget: Option<BodyBudget> = None;

    for line in raw.lines() {
        if line.starts_with("@@") {
            let hunk = match parse_hunk_header(line) {
                Some(header) => {
                    budget = Some(BodyBudget {
                        old: header.old_count.unwrap_or(1),
                        new: header.new_count.unwrap_or(1),
                    });
                    DiffHunk::from_header(header)
                }
                None => {
                    tracing::debug!(header = line, "malformed hunk header, assuming line 1");
                    budget = None;
                    DiffHunk::fallback()
                }
            };
            hunks.push(hunk);
            continue;
        }

        // Inside an announced body, `---foo` is a removed `--foo` line.
        let in_body = budget.is_some_and(|b| b.open());
        if !in_body && is_metadata(line) {
            continue;
        }
        let Some(hunk) = hunks.last_mut() else {
            continue;
        };

        let (tag, text) = if let Some(text) = line.strip_prefix('-') {
            (LineTag::Removed, text)
        } else if let Some(text) = line.strip_prefix('+') {
            (LineTag::Added, text)
        } else if let Some(text) = line.strip_prefix(' ') {
            (LineTag::Context, text)
        } else {
            continue;
        };

        if let Some(b) = budget.as_mut() {
            match tag {
                LineTag::Removed => b.old = b.old.saturating_sub(1),
                LineTag::Added => b.new = b.new.saturating_sub(1),
                LineTag::Context => {
                    b.old = b.old.saturating_sub(1);
                    b.new = b.new.saturating_sub(1);
                }
            }
        }

        hunk.edits.push(LineEdit {
            tag,
            text: text.to_string(),
        });
    }

    hunks
}

/// One line of the projected file view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedLine {
    /// 1-based line number in the file at the revision. `None` for removed lines.
    pub new_line: Option<usize>,
    /// 1-based line number in the parent's file. `None` for added lines.
    pub old_line: Option<usize>,
    /// Kind of line.
    pub tag: LineTag,
    /// Line text.
    pub text: String,
}

/// Result of projecting a diff onto a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    /// Annotated lines in display order.
    pub lines: Vec<AnnotatedLine>,
    /// Number of `+` lines in the diff.
    pub additions: usize,
    /// Number of `-` lines in the diff.
    pub deletions: usize,
    /// Number of hunks parsed.
    pub hunk_count: usize,
    /// Headers that fell back to line 1.
    pub malformed_headers: usize,
    /// Row index where each contiguous block of changed lines starts.
    pub change_starts: Vec<usize>,
}

impl Projection {
    /// `+N -M` summary.
    pub fn summary(&self) -> String {
        format!("+{} -{}", self.additions, self.deletions)
    }

    /// Total rows.
    pub fn row_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether any line is added or removed.
    pub fn has_changes(&self) -> bool {
        !self.change_starts.is_empty()
    }

    /// Start row of the next change block after `current_row`.
    pub fn next_change_row(&self, current_row: usize) -> Option<usize> {
        let idx = self.change_starts.partition_point(|&r| r <= current_row);
        self.change_starts.get(idx).copied()
    }

    /// Start row of the previous change block before `current_row`.
    pub fn prev_change_row(&self, current_row: usize) -> Option<usize> {
        let idx = self.change_starts.partition_point(|&r| r < current_row);
        idx.checked_sub(1).map(|i| self.change_starts[i])
    }
}

/// Project `raw_diff` onto the full text of the file at the same revision.
///
/// Every file line appears exactly once, in order, tagged `Added` if the diff
/// introduced it and `Context` otherwise. Removed lines are placed right before
/// the line now occupying their position; removals past the end of the file come
/// last.
///
/// # Examples
///
/// ```
/// use ghist::core::{project, LineTag};
///
/// let diff = "@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n";
/// let view = project(diff, "a\nB\nc\n");
/// let tags: Vec<_> = view.lines.iter().map(|l| l.tag).collect();
/// assert_eq!(
///     tags,
///     [LineTag::Context, LineTag::Removed, LineTag::Added, LineTag::Context]
/// );
/// assert_eq!(view.summary(), "+1 -1");
/// ```
pub fn project(raw_diff: &str, file_text: &str) -> Projection {
    let _timer = Timer::start("project");
    let hunks = parse_hunks(raw_diff);

    let mut added_lines: BTreeSet<usize> = BTreeSet::new();
    let mut removed_before: BTreeMap<usize, Vec<(usize, String)>> = BTreeMap::new();
    let mut additions = 0;
    let mut deletions = 0;

    for hunk in &hunks {
        let mut old_counter = hunk.old_start;
        let mut new_counter = hunk.new_start;
        // An empty new range names the line before the gap.
        let removal_anchor_override = (hunk.new_count == Some(0)).then(|| hunk.new_start + 1);

        for edit in &hunk.edits {
            match edit.tag {
                LineTag::Removed => {
                    let key = removal_anchor_override.unwrap_or(new_counter.max(1));
                    removed_before
                        .entry(key)
                        .or_default()
                        .push((old_counter, edit.text.clone()));
                    old_counter += 1;
                    deletions += 1;
                }
                LineTag::Added => {
                    added_lines.insert(new_counter.max(1));
                    new_counter += 1;
                    additions += 1;
                }
                LineTag::Context => {
                    old_counter += 1;
                    new_counter += 1;
                }
            }
        }
    }

    let mut out = ProjectionBuilder::default();
    let file_lines: Vec<&str> = file_text.lines().collect();
    for (idx, text) in file_lines.iter().enumerate() {
        let line_no = idx + 1;
        if let Some(removed) = removed_before.remove(&line_no) {
            out.push_removed(removed);
        }
        if added_lines.contains(&line_no) {
            out.push_added(line_no, text);
        } else {
            out.push_context(line_no, text);
        }
    }
    // Keys left over are all past the last line; N+1 sorts first.
    for (_, removed) in std::mem::take(&mut removed_before) {
        out.push_removed(removed);
    }

    Projection {
        lines: out.lines,
        additions,
        deletions,
        hunk_count: hunks.len(),
        malformed_headers: hunks.iter().filter(|h| h.malformed).count(),
        change_starts: out.change_starts,
    }
}

#[derive(Default)]
struct ProjectionBuilder {
    lines: Vec<AnnotatedLine>,
    change_starts: Vec<usize>,
    added_emitted: usize,
    removed_emitted: usize,
}

impl ProjectionBuilder {
    fn push(&mut self, line: AnnotatedLine) {
        let is_change = line.tag != LineTag::Context;
        let prev_change = self
            .lines
            .last()
            .is_some_and(|l| l.tag != LineTag::Context);
        if is_change && !prev_change {
            self.change_starts.push(self.lines.len());
        }
        self.lines.push(line);
    }

    fn push_removed(&mut self, removed: Vec<(usize, String)>) {
        for (old_line, text) in removed {
            self.removed_emitted += 1;
            self.push(AnnotatedLine {
                new_line: None,
                old_line: Some(old_line),
                tag: LineTag::Removed,
                text,
            });
        }
    }

    fn push_added(&mut self, line_no: usize, text: &str) {
        self.added_emitted += 1;
        self.push(AnnotatedLine {
            new_line: Some(line_no),
            old_line: None,
            tag: LineTag::Added,
            text: text.to_string(),
        });
    }

    fn push_context(&mut self, line_no: usize, text: &str) {
        let old = (line_no + self.removed_emitted).saturating_sub(self.added_emitted);
        self.push(AnnotatedLine {
            new_line: Some(line_no),
            old_line: (old > 0).then_some(old),
            tag: LineTag::Context,
            text: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(p: &Projection) -> Vec<LineTag> {
        p.lines.iter().map(|l| l.tag).collect()
    }

    fn texts(p: &Projection) -> Vec<&str> {
        p.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn header_full_and_short_forms() {
        let h = parse_hunk_header("@@ -1,4 +1,5 @@").unwrap();
        assert_eq!(h.old_start, 1);
        assert_eq!(h.old_count, Some(4));
        assert_eq!(h.new_start, 1);
        assert_eq!(h.new_count, Some(5));
        assert_eq!(h.section, "");

        let h = parse_hunk_header("@@ -7 +9 @@").unwrap();
        assert_eq!((h.old_start, h.new_start), (7, 9));
        assert_eq!((h.old_count, h.new_count), (None, None));
    }

    #[test]
    fn header_rejects_garbage() {
        assert!(parse_hunk_header("@@ nonsense @@").is_none());
        assert!(parse_hunk_header("@@ -a,b +c,d @@").is_none());
        assert!(parse_hunk_header("@@ -1,2 @@").is_none());
        assert!(parse_hunk_header("@@").is_none());
    }

    #[test]
    fn empty_diff_is_all_context() {
        let p = project("", "one\ntwo\nthree\n");
        assert_eq!(tags(&p), vec![LineTag::Context; 3]);
        let numbers: Vec<_> = p.lines.iter().map(|l| l.new_line).collect();
        assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(p.summary(), "+0 -0");
        assert!(!p.has_changes());
    }

    #[test]
    fn replace_in_middle() {
        let diff = "\
diff --git a/f.txt b/f.txt
index 1111111..2222222 100644
--- a/f.txt
+++ b/f.txt
@@ -1,3 +1,3 @@
 a
-b
+B
 c
";
        let p = project(diff, "a\nB\nc\n");
        assert_eq!(
            p.lines,
            vec![
                AnnotatedLine {
                    new_line: Some(1),
                    old_line: Some(1),
                    tag: LineTag::Context,
                    text: "a".into()
                },
                AnnotatedLine {
                    new_line: None,
                    old_line: Some(2),
                    tag: LineTag::Removed,
                    text: "b".into()
                },
                AnnotatedLine {
                    new_line: Some(2),
                    old_line: None,
                    tag: LineTag::Added,
                    text: "B".into()
                },
                AnnotatedLine {
                    new_line: Some(3),
                    old_line: Some(3),
                    tag: LineTag::Context,
                    text: "c".into()
                },
            ]
        );
        assert_eq!((p.additions, p.deletions), (1, 1));
        assert_eq!(p.hunk_count, 1);
    }

    #[test]
    fn root_commit_all_added() {
        let diff = "\
diff --git a/f.txt b/f.txt
new file mode 100644
index 0000000..587be6b
--- /dev/null
+++ b/f.txt
@@ -0,0 +1 @@
+x
";
        let p = project(diff, "x\n");
        assert_eq!(p.lines.len(), 1);
        assert_eq!(p.lines[0].new_line, Some(1));
        assert_eq!(p.lines[0].tag, LineTag::Added);
        assert_eq!(p.lines[0].text, "x");
        assert_eq!(p.summary(), "+1 -0");
    }

    #[test]
    fn removal_at_end_of_file_is_flushed_last() {
        let diff = "@@ -1,3 +1,2 @@\n a\n b\n-c\n";
        let p = project(diff, "a\nb\n");
        assert_eq!(texts(&p), vec!["a", "b", "c"]);
        assert_eq!(p.lines[2].tag, LineTag::Removed);
        assert_eq!(p.lines[2].old_line, Some(3));
    }

    #[test]
    fn pure_deletion_hunk_anchors_after_gap() {
        // Line 3 of five removed; git reports the new range as "+2,0".
        let diff = "@@ -3 +2,0 @@\n-three\n";
        let p = project(diff, "one\ntwo\nfour\nfive\n");
        assert_eq!(texts(&p), vec!["one", "two", "three", "four", "five"]);
        assert_eq!(p.lines[2].tag, LineTag::Removed);
        assert_eq!(p.lines[2].old_line, Some(3));
        assert_eq!(p.lines[3].old_line, Some(4));
    }

    #[test]
    fn removal_at_file_start() {
        let diff = "@@ -1,2 +0,0 @@\n-gone\n-also gone\n";
        let p = project(diff, "");
        assert_eq!(texts(&p), vec!["gone", "also gone"]);
        assert!(p.lines.iter().all(|l| l.tag == LineTag::Removed));
    }

    #[test]
    fn multiple_hunks_keep_line_numbers() {
        let diff = "\
@@ -1,2 +1,3 @@
 a
+a2
 b
@@ -8,2 +9,1 @@
 h
-i
";
        let file = "a\na2\nb\nc\nd\ne\nf\ng\nh\n";
        let p = project(diff, file);
        let added: Vec<_> = p
            .lines
            .iter()
            .filter(|l| l.tag == LineTag::Added)
            .map(|l| l.new_line)
            .collect();
        assert_eq!(added, vec![Some(2)]);
        let last = p.lines.last().unwrap();
        assert_eq!(last.tag, LineTag::Removed);
        assert_eq!(last.old_line, Some(9));
        assert_eq!(last.text, "i");
        // Context after the addition is shifted by one on the old side.
        let c = p.lines.iter().find(|l| l.text == "c").unwrap();
        assert_eq!((c.new_line, c.old_line), (Some(4), Some(3)));
        assert_eq!(p.change_starts.len(), 2);
    }

    #[test]
    fn dashed_removal_inside_counted_body() {
        // The removed line is "-- note", which renders as "--- note".
        let diff = "@@ -1,2 +1,1 @@\n keep\n--- note\n";
        let p = project(diff, "keep\n");
        assert_eq!(texts(&p), vec!["keep", "-- note"]);
        assert_eq!(p.deletions, 1);
    }

    #[test]
    fn malformed_header_falls_back_to_line_one() {
        let diff = "@@ garbage @@\n+first\n";
        let p = project(diff, "first\nsecond\n");
        assert_eq!(p.malformed_headers, 1);
        assert_eq!(tags(&p), vec![LineTag::Added, LineTag::Context]);
        assert_eq!(texts(&p), vec!["first", "second"]);
    }

    #[test]
    fn artifacts_are_skipped() {
        let diff = "@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n\\ No newline at end of file\n";
        let p = project(diff, "new");
        assert_eq!(texts(&p), vec!["old", "new"]);
        assert_eq!((p.additions, p.deletions), (1, 1));
    }

    #[test]
    fn out_of_range_hunk_does_not_lose_lines() {
        let diff = "@@ -40,2 +40,1 @@\n-x\n y\n";
        let p = project(diff, "a\nb\n");
        assert_eq!(texts(&p), vec!["a", "b", "x"]);
    }

    #[test]
    fn projection_is_deterministic() {
        let diff = "@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n";
        assert_eq!(project(diff, "a\nB\nc\n"), project(diff, "a\nB\nc\n"));
    }

    #[test]
    fn change_navigation() {
        let diff = "@@ -1,5 +1,5 @@\n-a\n+A\n b\n c\n d\n-e\n+E\n";
        let p = project(diff, "A\nb\nc\nd\nE\n");
        assert_eq!(p.change_starts, vec![0, 5]);
        assert_eq!(p.next_change_row(0), Some(5));
        assert_eq!(p.next_change_row(5), None);
        assert_eq!(p.prev_change_row(5), Some(0));
        assert_eq!(p.prev_change_row(0), None);
    }

    #[test]
    fn hunk_counts() {
        let hunks = parse_hunks("@@ -1,2 +1,2 @@ fn f()\n-a\n+b\n c\n");
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].section, "fn f()");
        assert_eq!(hunks[0].additions(), 1);
        assert_eq!(hunks[0].deletions(), 1);
        assert!(!hunks[0].malformed);
    }
}
