//! Result type for command execution.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::platform::Mode;

/// Outcome of one command sent to the device.
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    command: String,
    output: String,
    raw_output: String,
    prompt: String,
    mode: Mode,
    pages: usize,
    elapsed: Duration,
    failure_message: Option<String>,
}

impl CommandResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        command: impl Into<String>,
        output: impl Into<String>,
        raw_output: impl Into<String>,
        prompt: impl Into<String>,
        mode: Mode,
        pages: usize,
        elapsed: Duration,
        failure_message: Option<String>,
    ) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
            raw_output: raw_output.into(),
            prompt: prompt.into(),
            mode,
            pages,
            elapsed,
            failure_message,
        }
    }

    /// The command that was sent.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Output with the echo and pagination markers removed.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Output exactly as received, markers included.
    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    /// The prompt that ended the output.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The mode the device was in afterward.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of output pages; 1 when no pagination marker appeared.
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Time from write to prompt.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The device error string found in the output, if any.
    pub fn failure_message(&self) -> Option<&str> {
        self.failure_message.as_deref()
    }

    /// Check if the device accepted the command.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Get the output lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }
}

impl std::fmt::Display for CommandResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output)
    }
}
