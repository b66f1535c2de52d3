//! Word-level emphasis for replaced lines.

use similar::{ChangeTag, TextDiff};

use crate::core::{AnnotatedLine, LineTag};

/// Below this similarity a pair is treated as a full rewrite and not emphasized.
const MIN_SIMILARITY: f32 = 0.3;

/// Byte range of a line, flagged when it differs from its counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineSpan {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Whether the range was changed.
    pub changed: bool,
}

/// Word diff of one removed/added pair: spans for the old and the new text.
///
/// Returns `None` when the lines share too little to make emphasis useful.
pub fn word_spans(old: &str, new: &str) -> Option<(Vec<InlineSpan>, Vec<InlineSpan>)> {
    let diff = TextDiff::from_unicode_words(old, new);
    if diff.ratio() < MIN_SIMILARITY {
        return None;
    }

    let mut old_spans = Vec::new();
    let mut new_spans = Vec::new();
    let mut old_pos = 0;
    let mut new_pos = 0;

    for change in diff.iter_all_changes() {
        let len = change.value().len();
        match change.tag() {
            ChangeTag::Equal => {
                push_span(&mut old_spans, old_pos, len, false);
                push_span(&mut new_spans, new_pos, len, false);
                old_pos += len;
                new_pos += len;
            }
            ChangeTag::Delete => {
                push_span(&mut old_spans, old_pos, len, true);
                old_pos += len;
            }
            ChangeTag::Insert => {
                push_span(&mut new_spans, new_pos, len, true);
                new_pos += len;
            }
        }
    }

    Some((old_spans, new_spans))
}

/// Append a span, merging with the previous one when the flag matches.
fn push_span(spans: &mut Vec<InlineSpan>, start: usize, len: usize, changed: bool) {
    if len == 0 {
        return;
    }
    if let Some(last) = spans.last_mut() {
        if last.changed == changed && last.end == start {
            last.end = start + len;
            return;
        }
    }
    spans.push(InlineSpan {
        start,
        end: start + len,
        changed,
    });
}

/// Inline spans per projected row.
///
/// A run of removed rows directly followed by a run of added rows is paired
/// index-wise; surplus rows on either side and all context rows get `None`.
pub fn inline_changes(lines: &[AnnotatedLine]) -> Vec<Option<Vec<InlineSpan>>> {
    let mut out: Vec<Option<Vec<InlineSpan>>> = vec![None; lines.len()];
    let mut i = 0;

    while i < lines.len() {
        if lines[i].tag != LineTag::Removed {
            i += 1;
            continue;
        }
        let removed_start = i;
        while i < lines.len() && lines[i].tag == LineTag::Removed {
            i += 1;
        }
        let added_start = i;
        while i < lines.len() && lines[i].tag == LineTag::Added {
            i += 1;
        }

        let pairs = (added_start - removed_start).min(i - added_start);
        for k in 0..pairs {
            let old_idx = removed_start + k;
            let new_idx = added_start + k;
            if let Some((old, new)) = word_spans(&lines[old_idx].text, &lines[new_idx].text) {
                out[old_idx] = Some(old);
                out[new_idx] = Some(new);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project;

    #[test]
    fn changed_word_is_flagged() {
        let (old, new) = word_spans("let x = 1;", "let x = 2;").unwrap();
        let old_changed: Vec<_> = old.iter().filter(|s| s.changed).collect();
        let new_changed: Vec<_> = new.iter().filter(|s| s.changed).collect();
        assert_eq!(old_changed.len(), 1);
        assert_eq!(&"let x = 1;"[old_changed[0].start..old_changed[0].end], "1");
        assert_eq!(&"let x = 2;"[new_changed[0].start..new_changed[0].end], "2");
    }

    #[test]
    fn spans_cover_whole_line() {
        let (old, new) = word_spans("alpha beta gamma", "alpha delta gamma").unwrap();
        assert_eq!(old.first().map(|s| s.start), Some(0));
        assert_eq!(old.last().map(|s| s.end), Some("alpha beta gamma".len()));
        assert_eq!(new.last().map(|s| s.end), Some("alpha delta gamma".len()));
    }

    #[test]
    fn unrelated_lines_are_not_emphasized() {
        assert!(word_spans("alpha", "omega").is_none());
    }

    #[test]
    fn pairs_removed_run_with_following_added_run() {
        let diff = "@@ -1,3 +1,3 @@\n a\n-value = 1\n+value = 2\n c\n";
        let p = project(diff, "a\nvalue = 2\nc\n");
        let spans = inline_changes(&p.lines);
        assert_eq!(spans.len(), 4);
        assert!(spans[0].is_none());
        assert!(spans[1].is_some());
        assert!(spans[2].is_some());
        assert!(spans[3].is_none());
    }

    #[test]
    fn unpaired_lines_have_no_spans() {
        let diff = "@@ -1,2 +1,1 @@\n-gone\n keep\n";
        let p = project(diff, "keep\n");
        assert!(inline_changes(&p.lines).iter().all(Option::is_none));
    }
}
