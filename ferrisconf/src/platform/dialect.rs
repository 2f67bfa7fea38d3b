//! Device dialect: prompt grammar plus the commands that move between modes.

use regex::bytes::Regex;

use super::mode::Mode;
use super::prompt::PromptSpec;

/// Everything the session automaton needs to know about a CLI dialect.
///
/// Built in code by the functions in [`vendors`](super::vendors); callers can
/// start from one of those and override individual fields.
#[derive(Debug, Clone)]
pub struct Dialect {
    /// Dialect name (e.g., "cisco_ios").
    pub name: String,

    /// Prompt grammar.
    pub prompts: PromptSpec,

    /// Text printed when login credentials are refused.
    pub login_denied: Vec<Regex>,

    /// Command that escalates user exec to privileged exec.
    pub enable_command: String,

    /// Text printed when the enable secret is refused.
    pub enable_denied: Vec<Regex>,

    /// How many times a pending password prompt is answered with an empty
    /// line before giving up on getting back to user exec.
    pub password_retries: usize,

    /// Command that enters global configuration.
    pub config_command: String,

    /// Command that leaves one configuration level.
    pub exit_command: String,

    /// Command that drops privileged exec back to user exec.
    pub disable_command: String,

    /// Command that ends the CLI session.
    pub logout_command: String,

    /// Command that copies the running configuration to startup.
    pub persist_command: String,

    /// Questions the save command may ask; each is answered with a bare return.
    pub persist_questions: Vec<Regex>,

    /// Text the device prints once the configuration has been saved.
    pub persist_confirmation: Regex,

    /// Keystroke that continues paginated output.
    pub continue_keystroke: String,

    /// Line terminator appended to every command.
    pub return_char: String,

    /// Substrings that mark a command's output as a failure.
    pub failed_when_contains: Vec<String>,
}

impl Dialect {
    /// Create a dialect with IOS-style default commands and the given grammar.
    pub fn new(name: impl Into<String>, prompts: PromptSpec) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            prompts,
            login_denied: vec![],
            enable_command: "enable".to_string(),
            enable_denied: vec![],
            password_retries: 3,
            config_command: "configure terminal".to_string(),
            exit_command: "exit".to_string(),
            disable_command: "disable".to_string(),
            logout_command: "exit".to_string(),
            persist_command: "write memory".to_string(),
            persist_questions: vec![],
            persist_confirmation: Regex::new(r"\[OK\]")?,
            continue_keystroke: " ".to_string(),
            return_char: "\n".to_string(),
            failed_when_contains: vec![],
        })
    }

    /// Add a login denial pattern.
    pub fn with_login_denied(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.login_denied.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Add an enable denial pattern.
    pub fn with_enable_denied(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.enable_denied.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Add a question the save command may ask.
    pub fn with_persist_question(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.persist_questions.push(Regex::new(pattern)?);
        Ok(self)
    }

    /// Set the save command and its confirmation text.
    pub fn with_persist(
        mut self,
        command: impl Into<String>,
        confirmation: &str,
    ) -> Result<Self, regex::Error> {
        self.persist_command = command.into();
        self.persist_confirmation = Regex::new(confirmation)?;
        Ok(self)
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// The command that leaves `mode` for its parent mode.
    pub fn deescalate_command(&self, mode: Mode) -> Option<&str> {
        match mode {
            Mode::SubConfig(_) | Mode::GlobalConfig => Some(self.exit_command.as_str()),
            Mode::PrivilegedExec => Some(self.disable_command.as_str()),
            _ => None,
        }
    }

    /// The first failure pattern contained in `output`, if any.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|p| output.contains(p.as_str()))
            .map(String::as_str)
    }
}
