//! Automaton tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timeouts and buffer limits for a session.
///
/// Every wait the automaton performs is bounded by one of these timeouts.
/// Missing fields take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Wait for each login prompt or the first exec prompt.
    pub auth_timeout: Duration,

    /// Wait for each prompt or pagination marker after a command.
    pub command_timeout: Duration,

    /// Wait for the save command to finish.
    pub persist_timeout: Duration,

    /// Maximum bytes of transcript kept for the current command.
    pub transcript_limit: usize,

    /// Bytes from the end of unread output searched for patterns.
    pub search_depth: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            auth_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(30),
            persist_timeout: Duration::from_secs(60),
            transcript_limit: 64 * 1024,
            search_depth: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: SessionSettings =
            serde_json::from_str(r#"{"command_timeout":{"secs":5,"nanos":0}}"#).unwrap();
        assert_eq!(settings.command_timeout, Duration::from_secs(5));
        assert_eq!(settings.auth_timeout, Duration::from_secs(30));
        assert_eq!(settings.search_depth, 1000);
    }
}
