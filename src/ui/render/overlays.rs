//! Overlay rendering (help, jump-to-file prompt).

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::app::App;

use super::helpers::truncate_str;

/// A centered box of at most `width` x `height`, leaving a one-cell margin.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2).max(1));
    let height = height.min(area.height.saturating_sub(2).max(1));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn overlay_block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent))
        .title(Span::styled(
            title,
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(app.theme.bg_surface))
}

/// Render the help overlay.
pub fn render_help_overlay(frame: &mut Frame, app: &App) {
    let entries = [
        ("← / →", "Older / newer commit"),
        ("j/k or ↑/↓", "Commits (list) or scroll (detail)"),
        ("h / l", "Scroll horizontally"),
        ("PgUp / PgDn", "Page up / down"),
        ("g / G", "First / last commit, or top / bottom"),
        ("{ / }", "Previous / next change"),
        ("Tab", "Switch focus between commits/detail"),
        ("f", "Jump to another file"),
        ("?", "Close this help overlay"),
        ("q", "Quit"),
        ("Ctrl+C", "Interrupt"),
    ];

    let overlay_area = centered(frame.area(), 70, (entries.len() as u16 + 6).max(10));
    frame.render_widget(Clear, overlay_area);

    let block = overlay_block(app, " Help ");
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
        return;
    }

    let bg = app.theme.bg_surface;
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Common keybindings",
            Style::default()
                .fg(app.theme.accent)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Press ? again, Esc, or q to close.",
            Style::default().fg(app.theme.text_muted).bg(bg),
        )),
        Line::default(),
    ];

    for (key, desc) in entries {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<16}", key),
                Style::default().fg(app.theme.accent).bg(bg),
            ),
            Span::styled(desc, Style::default().fg(app.theme.text_normal).bg(bg)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the jump-to-file completion list.
pub fn render_prompt_overlay(frame: &mut Frame, app: &App) {
    let prompt = &app.prompt;
    let rows = prompt.matches.len().max(1) as u16;
    let overlay_area = centered(frame.area(), 70, rows + 4);
    frame.render_widget(Clear, overlay_area);

    let block = overlay_block(app, " Jump to file ");
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
        return;
    }

    let bg = app.theme.bg_surface;
    let width = inner.width as usize;
    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled("> ", Style::default().fg(app.theme.accent).bg(bg)),
            Span::styled(
                prompt.input.as_str(),
                Style::default().fg(app.theme.text_bright).bg(bg),
            ),
            Span::styled("█", Style::default().fg(app.theme.accent).bg(bg)),
        ]),
        Line::default(),
    ];

    if prompt.matches.is_empty() {
        lines.push(Line::from(Span::styled(
            "No matching tracked files",
            Style::default().fg(app.theme.text_muted).bg(bg),
        )));
    }

    for (pos, &idx) in prompt.matches.iter().enumerate() {
        let Some(path) = prompt.candidates.get(idx) else {
            continue;
        };
        let is_selected = pos == prompt.selected;
        let style = if is_selected {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.bg_selected)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text_normal).bg(bg)
        };
        let marker = if is_selected { "▌" } else { " " };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(app.theme.accent).bg(bg)),
            Span::styled(truncate_str(path.as_str(), width.saturating_sub(1)), style),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
