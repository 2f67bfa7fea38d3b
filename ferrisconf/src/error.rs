//! Error types for ferrisconf.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::platform::Mode;

/// Main error type for ferrisconf operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport setup errors (SSH/Telnet connection, authentication).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors (pattern waits, stream closure).
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session automaton errors.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Command catalog and template errors.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

impl Error {
    /// The session error behind this error, if any.
    ///
    /// Template step failures are unwrapped to the session error that
    /// aborted the step.
    pub fn session(&self) -> Option<&SessionError> {
        match self {
            Error::Session(e) => Some(e),
            Error::Template(TemplateError::StepFailed { source, .. }) => source.session(),
            _ => None,
        }
    }

    /// Whether the session can no longer be used after this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Session(e) => e.is_fatal(),
            Error::Template(TemplateError::StepFailed { source, .. }) => source.is_fatal(),
            Error::Channel(ChannelError::Closed) => true,
            Error::Transport(_) => true,
            _ => false,
        }
    }
}

/// Transport layer errors (SSH/Telnet connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key does not match the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not in known_hosts and strict checking is enabled
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// Reading or writing known_hosts failed
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Connection settings are incomplete
    #[error("Invalid connection settings: {message}")]
    InvalidConfig { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (pattern matching, raw stream operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Stream reached end of input
    #[error("Channel closed")]
    Closed,

    /// No patterns were supplied to a read
    #[error("No patterns to wait for")]
    NoPatterns,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// I/O error on the underlying stream
    #[error("Channel I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Session automaton errors.
///
/// Every variant names the step that failed and the mode the device was last
/// confirmed to be in, so an operator can recover by hand.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No exec prompt appeared after the credentials were sent
    #[error("Authentication timed out at '{step}' after {timeout:?} (mode: {mode})")]
    AuthTimeout {
        step: String,
        mode: Mode,
        timeout: Duration,
    },

    /// The device re-prompted for login or printed a denial
    #[error("Credentials rejected at '{step}' (mode: {mode})")]
    AuthRejected { step: String, mode: Mode },

    /// The device asked for an enable secret but none was configured
    #[error("Enable secret required at '{step}' (mode: {mode})")]
    EnableSecretRequired { step: String, mode: Mode },

    /// The enable secret was rejected
    #[error("Enable secret rejected at '{step}' (mode: {mode})")]
    EnableDenied { step: String, mode: Mode },

    /// A configuration-mode transition landed on an unexpected prompt
    #[error("Expected {expected} after '{step}' but device is in {mode} (prompt: '{prompt}')")]
    ConfigModeFailed {
        step: String,
        expected: Mode,
        mode: Mode,
        prompt: String,
    },

    /// The operation is not valid in the current mode
    #[error("'{step}' requires {expected} but device is in {mode}")]
    WrongMode {
        step: String,
        expected: Mode,
        mode: Mode,
    },

    /// No prompt or pagination marker appeared within the bounded wait
    #[error("'{step}' timed out after {timeout:?} (mode: {mode})")]
    CommandTimeout {
        step: String,
        mode: Mode,
        timeout: Duration,
    },

    /// The transport closed in the middle of a command
    #[error("Stream ended during '{step}' (last mode: {mode})")]
    UnexpectedEof { step: String, mode: Mode },

    /// The session is closed; nothing more can be sent
    #[error("Session closed at '{step}' (last mode: {mode})")]
    SessionClosed { step: String, mode: Mode },

    /// The save command returned without the device's confirmation
    #[error("'{step}' finished without confirmation (mode: {mode})")]
    PersistUnconfirmed { step: String, mode: Mode },
}

impl SessionError {
    /// The step (command or operation) that failed.
    pub fn step(&self) -> &str {
        match self {
            SessionError::AuthTimeout { step, .. }
            | SessionError::AuthRejected { step, .. }
            | SessionError::EnableSecretRequired { step, .. }
            | SessionError::EnableDenied { step, .. }
            | SessionError::ConfigModeFailed { step, .. }
            | SessionError::WrongMode { step, .. }
            | SessionError::CommandTimeout { step, .. }
            | SessionError::UnexpectedEof { step, .. }
            | SessionError::SessionClosed { step, .. }
            | SessionError::PersistUnconfirmed { step, .. } => step,
        }
    }

    /// The mode the device was last confirmed to be in.
    pub fn mode(&self) -> Mode {
        match self {
            SessionError::AuthTimeout { mode, .. }
            | SessionError::AuthRejected { mode, .. }
            | SessionError::EnableSecretRequired { mode, .. }
            | SessionError::EnableDenied { mode, .. }
            | SessionError::ConfigModeFailed { mode, .. }
            | SessionError::WrongMode { mode, .. }
            | SessionError::CommandTimeout { mode, .. }
            | SessionError::UnexpectedEof { mode, .. }
            | SessionError::SessionClosed { mode, .. }
            | SessionError::PersistUnconfirmed { mode, .. } => *mode,
        }
    }

    /// Whether this error invalidates the whole session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::UnexpectedEof { .. } | SessionError::SessionClosed { .. }
        )
    }
}

/// Command catalog and template errors.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// No template or query with this name in the catalog
    #[error("Unknown template '{name}'")]
    UnknownTemplate { name: String },

    /// A placeholder had no value
    #[error("Missing parameter '{name}' for '{template}'")]
    MissingParameter { template: String, name: String },

    /// A value would inject extra input into the device
    #[error("Invalid value for parameter '{name}': control characters are not allowed")]
    InvalidParameter { name: String },

    /// A step of a template failed; the remaining steps were not sent
    #[error("Step {index} ('{step}') of '{template}' failed: {source}")]
    StepFailed {
        template: String,
        index: usize,
        step: String,
        #[source]
        source: Box<Error>,
    },

    /// The device answered a command with an error string
    #[error("Device rejected '{command}': {message}")]
    CommandRejected { command: String, message: String },

    /// The prompt did not change to the requested hostname
    #[error("Prompt '{prompt}' does not reflect hostname '{hostname}'")]
    HostnameUnconfirmed { hostname: String, prompt: String },
}

/// Result type alias using ferrisconf's Error.
pub type Result<T> = std::result::Result<T, Error>;
