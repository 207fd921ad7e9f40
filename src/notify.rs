//! User-facing notifications, delegated to the embedding shell.
//!
//! The loop itself only logs. Anything that should reach the user (a tray
//! balloon, a desktop notification) goes through this seam so the library
//! stays free of UI concerns.

use tracing::{info, warn};

/// Receiver for the few user-visible events the loop produces.
pub trait Notifier: Send + Sync {
    /// The serial device was (re)opened successfully. Emitted once per
    /// successful open, never per tick.
    fn connected(&self, endpoint: &str);

    /// The loop has been failing repeatedly. Rate-limited by the caller;
    /// implementations can assume one call per degradation episode.
    fn degraded(&self, message: &str);
}

/// Default notifier that forwards events to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn connected(&self, endpoint: &str) {
        info!(endpoint, "display connected");
    }

    fn degraded(&self, message: &str) {
        warn!("telemetry degraded: {}", message);
    }
}
