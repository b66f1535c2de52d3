//! File-backed tracing setup and timing guards.
//!
//! The terminal belongs to the UI, so logs are only written when `GHIST_LOG`
//! names a file. `GHIST_LOG_LEVEL` takes an `EnvFilter` directive (default `info`).

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable naming the log file.
pub const LOG_PATH_ENV: &str = "GHIST_LOG";
/// Environment variable holding the filter directive.
pub const LOG_LEVEL_ENV: &str = "GHIST_LOG_LEVEL";

/// Install the global subscriber if `GHIST_LOG` is set.
///
/// Returns the log path in use, or `None` when logging stays off.
pub fn init() -> anyhow::Result<Option<PathBuf>> {
    let log_path = match std::env::var_os(LOG_PATH_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => return Ok(None),
    };

    let file = File::options().create(true).append(true).open(&log_path)?;
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()?;

    Ok(Some(log_path))
}

/// RAII timer that logs its lifetime at `debug` on drop.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Start a timer if `debug` events are enabled.
    #[inline]
    pub fn start(label: &'static str) -> Option<Self> {
        tracing::enabled!(tracing::Level::DEBUG).then(|| Self {
            label,
            start: Instant::now(),
        })
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        tracing::debug!(label = self.label, elapsed = ?self.start.elapsed(), "timing");
    }
}
