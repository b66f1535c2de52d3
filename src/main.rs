//! ghist - browse the git history of a file or repository in the terminal.

use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use ghist::config::{LayoutKind, Settings};
use ghist::core::Target;
use ghist::theme::Theme;
use ghist::ui::{handle_input, render, App, AppOptions};

/// Exit code after Ctrl+C.
const EXIT_INTERRUPTED: u8 = 130;

/// Step through the commits of a file or repository, one diff at a time.
#[derive(Parser, Debug)]
#[command(name = "ghist", version, about)]
struct Cli {
    /// Repository directory or tracked file
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Maximum number of commits to load (at least 1)
    #[arg(short = 'n', long = "limit", value_name = "N")]
    limit: Option<usize>,

    /// Do not follow the file across renames
    #[arg(long = "no-follow")]
    no_follow: bool,

    /// Presentation layout
    #[arg(long = "layout", value_enum)]
    layout: Option<LayoutKind>,

    /// Color theme (default, dracula, github, gruvbox, nord, or a user theme)
    #[arg(short = 't', long = "theme", value_name = "THEME")]
    theme: Option<String>,
}

/// RAII guard for terminal state. Restores terminal on drop (including panic).
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
    let _ = io::stdout().flush();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match ghist::logging::init() {
        Ok(Some(path)) => tracing::info!(log = %path.display(), "ghist starting"),
        Ok(None) => {}
        Err(e) => eprintln!("warning: logging disabled: {e:#}"),
    }

    let app = match setup(cli) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "setup failed");
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run_tui(app) {
        Ok(true) => ExitCode::from(EXIT_INTERRUPTED),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Resolve the target and load its history. Every failure here exits with 1.
fn setup(cli: Cli) -> Result<App> {
    let settings = Settings::load();
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let follow = !cli.no_follow && settings.follow_or_default();
    let target = Target::resolve(&cli.path, &cwd, follow)?;
    tracing::debug!(repo = %target.repo.as_str(), scope = %target.scope.label(), "resolved target");

    let limit = cli.limit.unwrap_or_else(|| settings.limit_or_default()).max(1);
    let theme_name = cli
        .theme
        .or_else(|| settings.theme.clone())
        .unwrap_or_else(|| "default".to_string());
    let options = AppOptions {
        limit,
        follow,
        layout: cli.layout.or(settings.layout).unwrap_or_default(),
        theme: Theme::load(&theme_name),
    };

    App::new(target, cwd, options)
}

/// Run the TUI until the user quits. Returns whether it was interrupted.
fn run_tui(mut app: App) -> Result<bool> {
    // Set panic hook to ensure terminal cleanup
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));

    let _guard = TerminalGuard::new().context("failed to set up terminal")?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    run_loop(&mut terminal, &mut app)?;
    tracing::info!(interrupted = app.interrupted, "ghist exiting");
    Ok(app.interrupted)
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Only redraw if dirty or on resize
        if app.ui.dirty {
            terminal.draw(|frame| render(frame, app))?;
            app.clear_dirty();
        }

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            let event = event::read()?;
            handle_input(app, event);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
