//! Detail pane: commit header and the annotated file view.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::core::{AnnotatedLine, CommitRecord, FileChangeKind, InlineSpan, LineTag};
use crate::highlight::{StyleId, StyledSpan};
use crate::theme::Theme;
use crate::ui::app::{App, CommitView, FileView, Focus};

use super::helpers::{
    boost_muted_fg, pad_to_width, style_to_color, truncate_str, ClippedLine, DATE_FORMAT,
    GUTTER_WIDTH,
};

/// Rows of commit metadata in the header.
const HEADER_ROWS: u16 = 5;

/// Render the detail pane.
pub fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Detail;
    let border_color = if is_focused {
        app.theme.border_active
    } else {
        app.theme.border_dim
    };
    let title_style = if is_focused {
        Style::default().fg(app.theme.accent)
    } else {
        Style::default().fg(app.theme.text_muted)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(" Commit ", title_style))
        .style(Style::default().bg(app.theme.bg_dark));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(commit) = app.selected_commit() else {
        let msg = Paragraph::new("No commit selected").style(Style::default().fg(app.theme.text_muted));
        frame.render_widget(msg, inner);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS + 1), // Header and rule
            Constraint::Length(1),               // Summary
            Constraint::Min(0),                  // File view
        ])
        .split(inner);

    render_header(frame, app, commit, chunks[0]);
    render_summary(frame, app, chunks[1]);

    match &app.view {
        CommitView::File(view) => render_file(frame, app, view, chunks[2]),
        CommitView::Repository { files } => render_changed_files(frame, app, files, chunks[2]),
        CommitView::NoContent { path, message } => render_notice(
            frame,
            &app.theme,
            chunks[2],
            "Unable to load file at this revision:",
            &[path.to_string(), message.clone()],
        ),
        CommitView::Binary { path } => render_notice(
            frame,
            &app.theme,
            chunks[2],
            "Binary file at this revision:",
            &[path.to_string()],
        ),
        CommitView::TooLarge { path, size } => render_notice(
            frame,
            &app.theme,
            chunks[2],
            "File too large to display at this revision:",
            &[format!("{path} ({size} bytes)")],
        ),
        CommitView::Empty => {}
    }
}

/// Commit metadata on the left 3/5, message on the right 2/5.
fn render_header(frame: &mut Frame, app: &App, commit: &CommitRecord, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border_dim));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(3, 5), Constraint::Ratio(2, 5)])
        .split(inner);

    let file = match &app.view {
        CommitView::File(view) => view.path.to_string(),
        CommitView::NoContent { path, .. }
        | CommitView::Binary { path }
        | CommitView::TooLarge { path, .. } => path.to_string(),
        CommitView::Repository { .. } | CommitView::Empty => app.scope.label(),
    };

    let mut oid = commit.oid.clone();
    if commit.is_merge() {
        oid.push_str(&format!(" (merge of {})", commit.parents.len()));
    } else if commit.is_root() {
        oid.push_str(" (root)");
    }

    let rows = [
        ("commit", oid),
        (
            "author",
            format!("{} <{}>", commit.author_name, commit.author_email),
        ),
        ("date", commit.authored_at.format(DATE_FORMAT).to_string()),
        ("file", file),
        (
            "position",
            format!("{}/{}", app.position(), app.commits.len()),
        ),
    ];
    let left: Vec<Line> = rows
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<10}"), Style::default().fg(theme.text_muted)),
                Span::styled(value, Style::default().fg(theme.text_normal)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(left), columns[0]);

    let mut message = vec![Line::from(Span::styled(
        commit.title.clone(),
        Style::default()
            .fg(theme.text_bright)
            .add_modifier(Modifier::BOLD),
    ))];
    message.extend(
        commit
            .body
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(theme.text_dim)))),
    );
    frame.render_widget(
        Paragraph::new(message).wrap(Wrap { trim: false }),
        columns[1],
    );
}

/// `Edited <path> (+N, -M)` line.
fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let spans = match &app.view {
        CommitView::File(view) => {
            let p = &view.projection;
            let mut spans = vec![
                Span::styled("Edited ", Style::default().fg(theme.text_muted)),
                Span::styled(
                    view.path.to_string(),
                    Style::default()
                        .fg(theme.text_bright)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" (", Style::default().fg(theme.text_muted)),
                Span::styled(format!("+{}", p.additions), Style::default().fg(theme.added)),
                Span::styled(", ", Style::default().fg(theme.text_muted)),
                Span::styled(format!("-{}", p.deletions), Style::default().fg(theme.removed)),
                Span::styled(")", Style::default().fg(theme.text_muted)),
            ];
            if p.malformed_headers > 0 {
                spans.push(Span::styled(
                    format!("  {} unreadable hunk header(s)", p.malformed_headers),
                    Style::default().fg(theme.warning),
                ));
            }
            spans
        }
        CommitView::Repository { files } => vec![Span::styled(
            format!("Changed {} file(s)", files.len()),
            Style::default().fg(theme.text_muted),
        )],
        _ => Vec::new(),
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_notice(frame: &mut Frame, theme: &Theme, area: Rect, heading: &str, details: &[String]) {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            heading.to_string(),
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(
        details
            .iter()
            .map(|d| Line::from(Span::styled(d.clone(), Style::default().fg(theme.text_muted)))),
    );
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_changed_files(
    frame: &mut Frame,
    app: &App,
    files: &[crate::core::ChangedFile],
    area: Rect,
) {
    let theme = &app.theme;
    let width = area.width as usize;
    let lines: Vec<Line> = files
        .iter()
        .skip(app.viewer.scroll_y)
        .take(area.height as usize)
        .map(|file| {
            let color = match file.kind {
                FileChangeKind::Added => theme.success,
                FileChangeKind::Modified => theme.warning,
                FileChangeKind::Deleted => theme.error,
                FileChangeKind::Renamed => theme.accent,
            };
            let path = match &file.old_path {
                Some(old) => format!("{old} → {}", file.path),
                None => file.path.to_string(),
            };
            Line::from(vec![
                Span::styled(
                    format!(" {} ", file.kind.badge()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    truncate_str(&path, width.saturating_sub(3)),
                    Style::default().fg(theme.text_normal),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// Colors for one kind of annotated line.
struct LinePalette {
    bg: Color,
    emphasis_bg: Color,
    marker_fg: Color,
}

impl LinePalette {
    fn for_tag(tag: LineTag, theme: &Theme) -> Self {
        match tag {
            LineTag::Added => Self {
                bg: theme.diff_insert_bg,
                emphasis_bg: theme.inline_insert_bg,
                marker_fg: theme.added,
            },
            LineTag::Removed => Self {
                bg: theme.diff_delete_bg,
                emphasis_bg: theme.inline_delete_bg,
                marker_fg: theme.removed,
            },
            LineTag::Context => Self {
                bg: theme.bg_dark,
                emphasis_bg: theme.bg_dark,
                marker_fg: theme.text_muted,
            },
        }
    }
}

fn render_file(frame: &mut Frame, app: &App, view: &FileView, area: Rect) {
    let width = area.width as usize;
    let max_content = width.saturating_sub(GUTTER_WIDTH);

    let lines: Vec<Line> = view
        .projection
        .lines
        .iter()
        .enumerate()
        .skip(app.viewer.scroll_y)
        .take(area.height as usize)
        .map(|(row, line)| {
            let inline = view.inline.get(row).and_then(Option::as_deref);
            let highlights = match line.tag {
                LineTag::Removed => None,
                _ => line
                    .new_line
                    .and_then(|n| view.highlights.line_spans(n - 1)),
            };
            render_annotated_line(app, line, highlights, inline, max_content, width)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_annotated_line(
    app: &App,
    line: &AnnotatedLine,
    highlights: Option<&[StyledSpan]>,
    inline: Option<&[InlineSpan]>,
    max_content: usize,
    width: usize,
) -> Line<'static> {
    let theme = &app.theme;
    let palette = LinePalette::for_tag(line.tag, theme);
    let number = |n: Option<usize>| n.map_or_else(|| "    ".to_string(), |n| format!("{n:>4}"));

    let mut spans = vec![
        Span::styled(
            format!("{} {}", number(line.old_line), number(line.new_line)),
            Style::default().fg(theme.text_muted).bg(palette.bg),
        ),
        Span::styled("│", Style::default().fg(theme.gutter_sep).bg(palette.bg)),
        Span::styled(
            format!("{} ", line.tag.marker()),
            Style::default().fg(palette.marker_fg).bg(palette.bg),
        ),
    ];

    let text = line.text.as_str();
    let default_span = StyledSpan {
        start: 0,
        end: text.len(),
        style_id: StyleId::Default,
    };
    let hl_spans = match highlights {
        Some(spans) if !spans.is_empty() => spans,
        _ => std::slice::from_ref(&default_span),
    };

    let mut out = ClippedLine::new(app.viewer.scroll_x, max_content);
    for hl in hl_spans {
        if out.is_full() {
            break;
        }
        let Some(part) = text.get(hl.start..hl.end).filter(|p| !p.is_empty()) else {
            continue;
        };
        let fg = style_to_color(hl.style_id, theme);
        let normal = Style::default().fg(fg).bg(palette.bg);

        match inline {
            Some(changes)
                if changes
                    .iter()
                    .any(|s| s.changed && s.start < hl.end && s.end > hl.start) =>
            {
                let emphasis = Style::default()
                    .fg(boost_muted_fg(fg, theme.text_normal))
                    .bg(palette.emphasis_bg);
                out.push_emphasized(part, hl.start, changes, normal, emphasis);
            }
            _ => out.push_str(part, normal),
        }
    }

    spans.extend(out.finish());
    pad_to_width(&mut spans, width, palette.bg);
    Line::from(spans)
}
