//! Commit list rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::app::{App, Focus};

use super::helpers::{pad_to_width, truncate_str, DATE_FORMAT};

/// Screen rows per commit: oid and title, then author and date.
const ROWS_PER_COMMIT: usize = 2;

/// Render the commit list.
pub fn render_commits(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Commits;
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
        .title(Span::styled(
            format!(" Commits ({}) ", app.commits.len()),
            title_style,
        ))
        .style(Style::default().bg(app.theme.bg_dark));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let capacity = (inner.height as usize / ROWS_PER_COMMIT).max(1);
    let selected = app.sidebar.selected_idx;

    // Keep the selection visible
    if selected < app.sidebar.scroll {
        app.sidebar.scroll = selected;
    } else if selected >= app.sidebar.scroll + capacity {
        app.sidebar.scroll = selected + 1 - capacity;
    }

    let width = inner.width as usize;
    let theme = &app.theme;
    let mut lines: Vec<Line> = Vec::with_capacity(inner.height as usize);

    for (idx, commit) in app
        .commits
        .iter()
        .enumerate()
        .skip(app.sidebar.scroll)
        .take(capacity)
    {
        let is_selected = idx == selected;
        let bg = if is_selected {
            theme.bg_selected
        } else {
            theme.bg_dark
        };
        let marker = if is_selected { "▌" } else { " " };

        let oid = commit.short_oid().to_string();
        let title_room = width.saturating_sub(oid.chars().count() + 2);
        let mut top = vec![
            Span::styled(marker, Style::default().fg(theme.accent).bg(bg)),
            Span::styled(oid, Style::default().fg(theme.warning).bg(bg)),
            Span::styled(" ", Style::default().bg(bg)),
            Span::styled(
                truncate_str(&commit.title, title_room),
                if is_selected {
                    Style::default()
                        .fg(theme.text_bright)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text_normal).bg(bg)
                },
            ),
        ];
        pad_to_width(&mut top, width, bg);

        let date = commit.authored_at.format(DATE_FORMAT).to_string();
        let author_room = width.saturating_sub(date.chars().count() + 4);
        let mut bottom = vec![
            Span::styled(marker, Style::default().fg(theme.accent).bg(bg)),
            Span::styled(
                format!(" {}", truncate_str(&commit.author_name, author_room)),
                Style::default().fg(theme.text_dim).bg(bg),
            ),
            Span::styled(" · ", Style::default().fg(theme.text_muted).bg(bg)),
            Span::styled(date, Style::default().fg(theme.text_muted).bg(bg)),
        ];
        pad_to_width(&mut bottom, width, bg);

        lines.push(Line::from(top));
        lines.push(Line::from(bottom));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
