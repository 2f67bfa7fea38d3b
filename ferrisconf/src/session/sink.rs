//! Destinations for command results.

use log::{Level, log, warn};
use tokio::sync::mpsc::UnboundedSender;

use super::result::CommandResult;

/// Receives every [`CommandResult`] a session produces.
pub trait ResultSink: Send {
    /// Accept one result.
    fn accept(&mut self, result: &CommandResult);
}

impl ResultSink for Vec<CommandResult> {
    fn accept(&mut self, result: &CommandResult) {
        self.push(result.clone());
    }
}

impl ResultSink for UnboundedSender<CommandResult> {
    fn accept(&mut self, result: &CommandResult) {
        if self.send(result.clone()).is_err() {
            warn!("result receiver dropped; discarding '{}'", result.command());
        }
    }
}

/// Writes a one-line summary of each result to the log.
#[derive(Debug, Clone)]
pub struct LogSink {
    level: Level,
}

impl LogSink {
    /// Log at the given level.
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl ResultSink for LogSink {
    fn accept(&mut self, result: &CommandResult) {
        match result.failure_message() {
            None => log!(
                self.level,
                "'{}' ok in {} ({} lines, {:?})",
                result.command(),
                result.mode(),
                result.lines().count(),
                result.elapsed()
            ),
            Some(message) => log!(
                self.level,
                "'{}' rejected in {}: {}",
                result.command(),
                result.mode(),
                message
            ),
        }
    }
}
