//! Scripted IOS-like router for driving the session automaton in tests.
//!
//! The router keeps its own mode and prints the prompts a real device would.
//! Writes are recorded line by line (without the line terminator) so tests
//! can assert the exact command sequence.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use regex::bytes::Regex;

use super::{ReadMatch, Transport};
use crate::channel::PatternBuffer;
use crate::error::{ChannelError, Result};
use crate::platform::{Mode, SubMode};

/// How the router greets a new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Login {
    /// Already authenticated; prints the exec prompt.
    None,
    /// Line password only.
    Password,
    /// Username then password.
    UsernamePassword,
    /// Prints nothing at all.
    Silent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Nothing,
    Username,
    Password,
    EnableSecret,
    Destination,
}

pub(crate) struct MockRouter {
    hostname: String,
    mode: Mode,
    username: String,
    password: String,
    enable_secret: Option<String>,
    pending: Pending,
    login_user_ok: bool,
    enable_failures: usize,
    echo: bool,
    /// Output pages per command; the mode effect still applies.
    pages: HashMap<String, Vec<String>>,
    /// Remaining pages waiting for the continue keystroke.
    queued: VecDeque<String>,
    /// Commands that get no reply at all.
    silent: HashSet<String>,
    /// Commands after which the connection drops.
    drop_on: HashSet<String>,
    /// Command prefixes answered with `% Invalid input`.
    rejects: Vec<String>,
    /// Save without printing `[OK]`.
    unconfirmed_save: bool,
    /// Ask for the destination filename on save.
    ask_destination: bool,
    /// Hostname changes are acknowledged but not applied.
    ignore_hostname: bool,
    writes: Vec<String>,
    output: PatternBuffer,
    closed: bool,
}

impl MockRouter {
    pub(crate) fn new(login: Login) -> Self {
        let mut router = Self {
            hostname: "R1".to_string(),
            mode: Mode::UserExec,
            username: "admin".to_string(),
            password: "cisco".to_string(),
            enable_secret: Some("class".to_string()),
            pending: Pending::Nothing,
            login_user_ok: true,
            enable_failures: 0,
            echo: true,
            pages: HashMap::new(),
            queued: VecDeque::new(),
            silent: HashSet::new(),
            drop_on: HashSet::new(),
            rejects: Vec::new(),
            unconfirmed_save: false,
            ask_destination: false,
            ignore_hostname: false,
            writes: Vec::new(),
            output: PatternBuffer::new(usize::MAX),
            closed: false,
        };
        match login {
            Login::None => {
                let prompt = router.prompt();
                router.emit(&format!("\n{prompt}"));
            }
            Login::Password => {
                router.pending = Pending::Password;
                router.emit("\nUser Access Verification\n\nPassword: ");
            }
            Login::UsernamePassword => {
                router.pending = Pending::Username;
                router.emit("\nUser Access Verification\n\nUsername: ");
            }
            Login::Silent => {}
        }
        router
    }

    /// A router already at the user exec prompt.
    pub(crate) fn at_user_exec() -> Self {
        Self::new(Login::None)
    }

    /// A router already at the privileged prompt.
    pub(crate) fn at_privileged() -> Self {
        Self::at_user_exec().with_mode(Mode::PrivilegedExec)
    }

    /// Move the router to `mode` and reprint the banner prompt.
    pub(crate) fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self.output.clear();
        let prompt = self.prompt();
        self.emit(&format!("\n{prompt}"));
        self
    }

    pub(crate) fn with_enable_secret(mut self, secret: Option<&str>) -> Self {
        self.enable_secret = secret.map(str::to_string);
        self
    }

    pub(crate) fn with_pages(mut self, command: &str, pages: &[&str]) -> Self {
        self.pages.insert(
            command.to_string(),
            pages.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    pub(crate) fn with_silent(mut self, command: &str) -> Self {
        self.silent.insert(command.to_string());
        self
    }

    pub(crate) fn with_drop_on(mut self, command: &str) -> Self {
        self.drop_on.insert(command.to_string());
        self
    }

    pub(crate) fn with_reject(mut self, prefix: &str) -> Self {
        self.rejects.push(prefix.to_string());
        self
    }

    pub(crate) fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub(crate) fn with_unconfirmed_save(mut self) -> Self {
        self.unconfirmed_save = true;
        self
    }

    pub(crate) fn with_destination_question(mut self) -> Self {
        self.ask_destination = true;
        self
    }

    pub(crate) fn with_ignored_hostname(mut self) -> Self {
        self.ignore_hostname = true;
        self
    }

    /// Every line written so far, without terminators.
    pub(crate) fn writes(&self) -> &[String] {
        &self.writes
    }

    /// Writes other than the continue keystroke.
    pub(crate) fn commands(&self) -> Vec<&str> {
        self.writes
            .iter()
            .map(String::as_str)
            .filter(|w| *w != " ")
            .collect()
    }

    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn hostname(&self) -> &str {
        &self.hostname
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    fn prompt(&self) -> String {
        let suffix = match self.mode {
            Mode::UserExec => ">",
            Mode::PrivilegedExec => "#",
            Mode::GlobalConfig => "(config)#",
            Mode::SubConfig(SubMode::Interface) => "(config-if)#",
            Mode::SubConfig(SubMode::Router) => "(config-router)#",
            Mode::Disconnected | Mode::LoginPrompt => "",
        };
        format!("{}{}", self.hostname, suffix)
    }

    fn emit(&mut self, text: &str) {
        self.output.extend(text.as_bytes());
    }

    /// Print a command's body, paginating if needed, then the prompt.
    fn reply(&mut self, mut body: VecDeque<String>) {
        if let Some(first) = body.pop_front() {
            self.emit(&first);
        }
        if body.is_empty() {
            let prompt = self.prompt();
            self.emit(&prompt);
        } else {
            self.emit(" --More-- ");
            self.queued = body;
        }
    }

    fn handle_line(&mut self, line: &str) {
        match self.pending {
            Pending::Username => {
                self.login_user_ok = line == self.username;
                self.pending = Pending::Password;
                self.emit("\nPassword: ");
                return;
            }
            Pending::Password => {
                if self.login_user_ok && line == self.password {
                    self.pending = Pending::Nothing;
                    let prompt = self.prompt();
                    self.emit(&format!("\n{prompt}"));
                } else {
                    self.pending = Pending::Username;
                    self.emit("\n% Login invalid\n\nUsername: ");
                }
                return;
            }
            Pending::EnableSecret => {
                if self.enable_secret.as_deref() == Some(line) {
                    self.pending = Pending::Nothing;
                    self.enable_failures = 0;
                    self.mode = Mode::PrivilegedExec;
                    let prompt = self.prompt();
                    self.emit(&format!("\n{prompt}"));
                } else {
                    self.enable_failures += 1;
                    if self.enable_failures >= 3 {
                        self.pending = Pending::Nothing;
                        self.enable_failures = 0;
                        let prompt = self.prompt();
                        self.emit(&format!("\n% Bad secrets\n\n{prompt}"));
                    } else {
                        self.emit("\nPassword: ");
                    }
                }
                return;
            }
            Pending::Destination => {
                self.pending = Pending::Nothing;
                self.save();
                return;
            }
            Pending::Nothing => {}
        }

        if line == " " && !self.queued.is_empty() {
            let rest = std::mem::take(&mut self.queued);
            self.reply(rest);
            return;
        }

        if self.echo {
            self.emit(&format!("{line}\n"));
        }
        if self.silent.contains(line) {
            return;
        }
        if self.drop_on.contains(line) {
            self.closed = true;
            return;
        }
        if self.rejects.iter().any(|r| line.starts_with(r.as_str())) {
            self.emit("                 ^\n% Invalid input detected at '^' marker.\n\n");
            self.reply(VecDeque::new());
            return;
        }

        let body: VecDeque<String> = self
            .pages
            .get(line)
            .map(|p| p.iter().cloned().collect())
            .unwrap_or_default();

        let words: Vec<&str> = line.split_whitespace().collect();
        match (self.mode, words.as_slice()) {
            (Mode::UserExec, ["enable"]) => {
                if self.enable_secret.is_some() {
                    self.pending = Pending::EnableSecret;
                    self.emit("Password: ");
                    return;
                }
                self.mode = Mode::PrivilegedExec;
            }
            (Mode::PrivilegedExec, ["disable"]) => self.mode = Mode::UserExec,
            (Mode::PrivilegedExec, ["configure", "terminal"]) => {
                self.emit("Enter configuration commands, one per line.  End with CNTL/Z.\n");
                self.mode = Mode::GlobalConfig;
            }
            (Mode::PrivilegedExec, ["write", "memory"]) => {
                if self.ask_destination {
                    self.pending = Pending::Destination;
                    self.emit("Destination filename [startup-config]? ");
                } else {
                    self.save();
                }
                return;
            }
            (Mode::UserExec | Mode::PrivilegedExec, ["exit"]) => {
                self.mode = Mode::Disconnected;
                self.closed = true;
                return;
            }
            (Mode::GlobalConfig | Mode::SubConfig(_), ["interface", ..]) => {
                self.mode = Mode::SubConfig(SubMode::Interface);
            }
            (Mode::GlobalConfig | Mode::SubConfig(_), ["router", ..]) => {
                self.mode = Mode::SubConfig(SubMode::Router);
            }
            (Mode::GlobalConfig, ["hostname", name]) => {
                if !self.ignore_hostname {
                    self.hostname = name.to_string();
                }
            }
            (Mode::GlobalConfig | Mode::SubConfig(_), ["end"]) => self.mode = Mode::PrivilegedExec,
            (Mode::SubConfig(_), ["exit"]) => self.mode = Mode::GlobalConfig,
            (Mode::GlobalConfig, ["exit"]) => self.mode = Mode::PrivilegedExec,
            _ => {}
        }
        self.reply(body);
    }

    fn save(&mut self) {
        self.emit("Building configuration...\n");
        if !self.unconfirmed_save {
            self.emit("[OK]\n");
        }
        let prompt = self.prompt();
        self.emit(&prompt);
    }
}

impl Transport for MockRouter {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(ChannelError::Closed.into());
        }
        let text = String::from_utf8_lossy(data).into_owned();
        let line = text.strip_suffix('\n').unwrap_or(&text).to_string();
        self.writes.push(line.clone());
        self.handle_line(&line);
        Ok(())
    }

    async fn read_until(&mut self, patterns: &[Regex], timeout: Duration) -> Result<ReadMatch> {
        if patterns.is_empty() {
            return Err(ChannelError::NoPatterns.into());
        }
        if let Some(span) = self.output.find_first(patterns) {
            return Ok(self.output.split_match(span));
        }
        if self.closed {
            return Err(ChannelError::Closed.into());
        }
        // Nothing more will arrive until the next write.
        Err(ChannelError::PatternTimeout(timeout).into())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
