//! CLI modes and the ladder between them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of configuration sub-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubMode {
    /// `(config-if)#` - interface configuration.
    Interface,
    /// `(config-router)#` - routing protocol configuration.
    Router,
}

/// The CLI mode a device is in.
///
/// Modes form a single chain from the login prompt to a configuration
/// sub-mode. The device keeps one current context, and so does the session.
///
/// ```text
/// Disconnected -> LoginPrompt -> UserExec -> PrivilegedExec -> GlobalConfig -> SubConfig(kind)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Disconnected,
    LoginPrompt,
    UserExec,
    PrivilegedExec,
    GlobalConfig,
    SubConfig(SubMode),
}

impl Mode {
    /// Depth of this mode on the ladder.
    ///
    /// `exit_to` walks back exactly `depth(current) - depth(target)` levels.
    pub fn depth(self) -> usize {
        match self {
            Mode::Disconnected | Mode::LoginPrompt => 0,
            Mode::UserExec => 1,
            Mode::PrivilegedExec => 2,
            Mode::GlobalConfig => 3,
            Mode::SubConfig(_) => 4,
        }
    }

    /// The mode one level up, reached by a single de-escalation command.
    pub fn parent(self) -> Option<Mode> {
        match self {
            Mode::Disconnected | Mode::LoginPrompt | Mode::UserExec => None,
            Mode::PrivilegedExec => Some(Mode::UserExec),
            Mode::GlobalConfig => Some(Mode::PrivilegedExec),
            Mode::SubConfig(_) => Some(Mode::GlobalConfig),
        }
    }

    /// Whether this is a configuration mode (global or sub-mode).
    pub fn is_config(self) -> bool {
        matches!(self, Mode::GlobalConfig | Mode::SubConfig(_))
    }

    /// Whether commands can be sent in this mode.
    pub fn is_interactive(self) -> bool {
        self.depth() > 0
    }

    /// The chain of modes from `self` up to `target`, excluding `self`.
    ///
    /// Returns `None` when `target` is not an ancestor of `self`. An empty
    /// path means `self == target`.
    pub fn path_up_to(self, target: Mode) -> Option<Vec<Mode>> {
        let mut path = Vec::new();
        let mut current = self;
        while current != target {
            current = current.parent()?;
            path.push(current);
        }
        Some(path)
    }
}

impl fmt::Display for SubMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubMode::Interface => write!(f, "interface"),
            SubMode::Router => write!(f, "router"),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Disconnected => write!(f, "disconnected"),
            Mode::LoginPrompt => write!(f, "login-prompt"),
            Mode::UserExec => write!(f, "user-exec"),
            Mode::PrivilegedExec => write!(f, "privileged-exec"),
            Mode::GlobalConfig => write!(f, "global-config"),
            Mode::SubConfig(kind) => write!(f, "{}-config", kind),
        }
    }
}
