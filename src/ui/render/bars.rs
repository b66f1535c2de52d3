//! Top and bottom bar rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::config::LayoutKind;
use crate::core::HistoryScope;
use crate::ui::app::{App, Focus, Mode};

use super::helpers::{pad_to_width, truncate_str};

/// Render the top bar showing the scope and repository.
pub fn render_top_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bar_bg = app.theme.bg_surface;
    let badge = match app.scope {
        HistoryScope::Repository => " REPO ",
        HistoryScope::File { .. } => " FILE ",
    };

    let mut spans = vec![
        Span::styled(" ", Style::default().bg(bar_bg)),
        Span::styled(
            badge,
            Style::default()
                .fg(app.theme.bg_dark)
                .bg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ", Style::default().bg(bar_bg)),
        Span::styled(
            app.scope.label(),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bar_bg)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    if let HistoryScope::File { follow: true, .. } = app.scope {
        spans.push(Span::styled(
            "  (following renames)",
            Style::default().fg(app.theme.text_muted).bg(bar_bg),
        ));
    }

    // Right-aligned repository root
    let left_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let room = (area.width as usize).saturating_sub(left_len + 4);
    let right_text = format!("{}  ", truncate_str(app.repo.as_str(), room));
    let right_len = right_text.chars().count();
    pad_to_width(&mut spans, (area.width as usize).saturating_sub(right_len), bar_bg);
    spans.push(Span::styled(
        right_text,
        Style::default().fg(app.theme.text_dim).bg(bar_bg),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the bottom bar with messages or key hints.
pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bar_bg = app.theme.bg_surface;

    let line = if app.ui.mode == Mode::Prompt {
        let match_info = format!(
            " ({}/{})",
            app.prompt.matches.len(),
            app.prompt.candidates.len()
        );
        Line::from(vec![
            Span::styled(" File: ", Style::default().fg(app.theme.accent).bg(bar_bg)),
            Span::styled(
                app.prompt.input.as_str(),
                Style::default().fg(app.theme.text_bright).bg(bar_bg),
            ),
            Span::styled("█", Style::default().fg(app.theme.accent).bg(bar_bg)),
            Span::styled(match_info, Style::default().fg(app.theme.text_muted).bg(bar_bg)),
            Span::styled(
                "  Tab: complete  Enter: load  Esc: cancel",
                Style::default().fg(app.theme.text_muted).bg(bar_bg),
            ),
        ])
    } else if let Some(ref err) = app.ui.error {
        Line::from(vec![
            Span::styled(" ✗ ", Style::default().fg(app.theme.error).bg(bar_bg)),
            Span::styled(err.as_str(), Style::default().fg(app.theme.error).bg(bar_bg)),
        ])
    } else if let Some(ref msg) = app.ui.status {
        Line::from(vec![
            Span::styled(" ✓ ", Style::default().fg(app.theme.success).bg(bar_bg)),
            Span::styled(msg.as_str(), Style::default().fg(app.theme.success).bg(bar_bg)),
        ])
    } else {
        key_hints(app)
    };

    let para = Paragraph::new(line).style(Style::default().bg(bar_bg));
    frame.render_widget(para, area);
}

fn key_hints(app: &App) -> Line<'static> {
    let hints: &[(&str, &str)] = match (app.layout, app.focus) {
        (LayoutKind::Split, Focus::Commits) => &[
            ("j/k", "commits"),
            ("←/→", "older/newer"),
            ("⇥", "switch"),
            ("f", "file"),
            ("?", "help"),
            ("q", "quit"),
        ],
        (LayoutKind::Split, Focus::Detail) => &[
            ("j/k", "scroll"),
            ("{/}", "changes"),
            ("←/→", "older/newer"),
            ("⇥", "switch"),
            ("f", "file"),
            ("?", "help"),
            ("q", "quit"),
        ],
        (LayoutKind::Detail, _) => &[
            ("←/→", "older/newer"),
            ("j/k", "scroll"),
            ("{/}", "changes"),
            ("f", "file"),
            ("?", "help"),
            ("q", "quit"),
        ],
    };

    let bar_bg = app.theme.bg_surface;
    let mut spans = vec![Span::styled(" ", Style::default().bg(bar_bg))];
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", Style::default().bg(bar_bg)));
        }
        spans.push(Span::styled(
            *key,
            Style::default().fg(app.theme.accent).bg(bar_bg),
        ));
        spans.push(Span::styled(
            format!(" {desc}"),
            Style::default().fg(app.theme.text_dim).bg(bar_bg),
        ));
    }
    Line::from(spans)
}
