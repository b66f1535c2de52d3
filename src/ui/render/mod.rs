//! UI rendering with ratatui.
//!
//! Design: muted chrome so the change markers and syntax colors carry the view.
//! - Added and removed lines get subtle backgrounds, changed words a stronger one
//! - Focused pane gets the active border color

mod bars;
mod commits;
mod detail;
mod helpers;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::config::LayoutKind;
use crate::logging::Timer;

use super::app::{App, Mode};

/// Width of the commit list in the split layout.
const COMMIT_LIST_WIDTH: u16 = 40;

/// Main render function.
pub fn render(frame: &mut Frame, app: &mut App) {
    let _timer = Timer::start("render_frame");

    // Fill background
    let bg_block = Block::default().style(Style::default().bg(app.theme.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Top bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(frame.area());

    bars::render_top_bar(frame, app, chunks[0]);
    render_main(frame, app, chunks[1]);
    bars::render_bottom_bar(frame, app, chunks[2]);

    // Overlays
    match app.ui.mode {
        Mode::Help => overlays::render_help_overlay(frame, app),
        Mode::Prompt => overlays::render_prompt_overlay(frame, app),
        Mode::Normal => {}
    }
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.layout {
        LayoutKind::Split => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(COMMIT_LIST_WIDTH), // Commit list
                    Constraint::Min(0),                    // Detail pane
                ])
                .split(area);
            commits::render_commits(frame, app, chunks[0]);
            detail::render_detail(frame, app, chunks[1]);
        }
        LayoutKind::Detail => detail::render_detail(frame, app, area),
    }
}
