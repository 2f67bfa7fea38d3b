//! The interactive CLI session automaton.
//!
//! The automaton owns one [`Transport`] and tracks the single mode the device
//! is in. Every transition is confirmed by classifying the prompt the device
//! prints afterward; nothing is assumed from the command that was sent. When
//! a wait expires or the device answers with an unexpected prompt, the
//! operation stops and the error names the step and the last confirmed mode.

use std::time::Duration;

use log::{debug, info, trace, warn};
use regex::bytes::Regex;
use secrecy::ExposeSecret;
use tokio::time::Instant;

use super::context::{HIDDEN, SessionContext};
use super::result::CommandResult;
use super::settings::SessionSettings;
use super::sink::ResultSink;
use crate::catalog::{Query, Template, TemplateStep};
use crate::error::{ChannelError, Error, Result, SessionError, TemplateError};
use crate::platform::{Dialect, Mode, SubMode};
use crate::transport::{ReadMatch, Transport};

/// What a matched pattern means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Prompt(Mode),
    More,
    Username,
    Password,
    Denied,
    Question,
    Confirmed,
}

/// Patterns to wait for, in priority order, and what each one means.
#[derive(Debug, Default)]
struct Expect {
    patterns: Vec<Regex>,
    signals: Vec<Signal>,
}

impl Expect {
    fn on(&mut self, pattern: &Regex, signal: Signal) -> &mut Self {
        self.patterns.push(pattern.clone());
        self.signals.push(signal);
        self
    }

    fn on_each(&mut self, patterns: &[Regex], signal: Signal) -> &mut Self {
        for pattern in patterns {
            self.on(pattern, signal);
        }
        self
    }

    fn prompts(&mut self, dialect: &Dialect) -> &mut Self {
        for prompt in dialect.prompts.prompts() {
            for pattern in &prompt.patterns {
                self.on(pattern, Signal::Prompt(prompt.mode));
            }
        }
        self
    }
}

/// The pattern sets used by each kind of wait, built once per session.
#[derive(Debug)]
struct Waits {
    login: Expect,
    enable: Expect,
    output: Expect,
    persist: Expect,
}

impl Waits {
    fn new(dialect: &Dialect) -> Self {
        let grammar = &dialect.prompts;

        let mut login = Expect::default();
        login
            .on(&grammar.username, Signal::Username)
            .on(&grammar.password, Signal::Password)
            .on_each(&dialect.login_denied, Signal::Denied)
            .prompts(dialect);

        let mut enable = Expect::default();
        enable
            .on(&grammar.password, Signal::Password)
            .on_each(&dialect.enable_denied, Signal::Denied)
            .prompts(dialect);

        let mut output = Expect::default();
        output
            .prompts(dialect)
            .on(&grammar.pagination, Signal::More);

        let mut persist = Expect::default();
        persist
            .on_each(&dialect.persist_questions, Signal::Question)
            .on(&dialect.persist_confirmation, Signal::Confirmed)
            .on(&grammar.pagination, Signal::More)
            .prompts(dialect);

        Self {
            login,
            enable,
            output,
            persist,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Wait {
    Login,
    Enable,
    Output,
    Persist,
}

/// Whether a closed stream means the session never started or died mid-command.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Login,
    Command,
}

#[derive(Debug, Clone, Copy)]
enum Secret {
    Password,
    Enable,
}

/// Output collected up to a prompt.
#[derive(Debug)]
struct Drained {
    text: String,
    raw: String,
    prompt: String,
    mode: Mode,
    pages: usize,
}

/// Drives one device through login, escalation, configuration and save.
///
/// # Example
///
/// ```rust,no_run
/// use ferrisconf::{Mode, SessionBuilder, catalog};
///
/// # async fn example() -> Result<(), ferrisconf::Error> {
/// let mut session = SessionBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("cisco")
///     .enable_secret("class")
///     .connect_telnet()
///     .await?;
///
/// session.authenticate().await?;
/// session.enter_privileged().await?;
///
/// let catalog = catalog::cisco_ios();
/// session
///     .apply_template(
///         catalog.template("loopback")?,
///         &[("loopback_id", "0"), ("address", "10.0.0.1"), ("mask", "255.255.255.0")],
///     )
///     .await?;
///
/// let brief = session.run_command("show ip interface brief", Mode::PrivilegedExec).await?;
/// println!("{}", brief.output());
///
/// session.logout().await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionAutomaton<T> {
    transport: T,
    dialect: Dialect,
    settings: SessionSettings,
    context: SessionContext,
    waits: Waits,
    sink: Option<Box<dyn ResultSink>>,
}

impl<T: Transport> SessionAutomaton<T> {
    /// Attach to a connected transport. The session starts at the login prompt.
    pub fn new(
        transport: T,
        dialect: Dialect,
        context: SessionContext,
        settings: SessionSettings,
    ) -> Self {
        let waits = Waits::new(&dialect);
        let mut context = context;
        context.set_mode(Mode::LoginPrompt);
        Self {
            transport,
            dialect,
            settings,
            context,
            waits,
            sink: None,
        }
    }

    /// Send every command result to `sink`.
    pub fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The mode the device was last confirmed to be in.
    pub fn mode(&self) -> Mode {
        self.context.mode()
    }

    /// Get the session context.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Get the dialect.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Get the settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the transport back, ending the session.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Log in.
    ///
    /// Answers the username and password prompts, or does nothing if the
    /// device already shows an exec prompt. Returns the mode reached.
    pub async fn authenticate(&mut self) -> Result<Mode> {
        let mut step = "login";
        self.require(step, Mode::LoginPrompt)?;
        let timeout = self.settings.auth_timeout;
        let mut sent_username = false;
        let mut sent_password = false;

        loop {
            let (signal, found) = self.expect(step, Wait::Login, timeout, Phase::Login).await?;
            match signal {
                Signal::Username => {
                    if sent_username || sent_password {
                        return Err(self.rejected(step));
                    }
                    let username = self.context.credentials.username.clone();
                    self.send(step, &username).await?;
                    sent_username = true;
                    step = "username";
                }
                Signal::Password => {
                    if sent_password {
                        return Err(self.rejected(step));
                    }
                    self.send_secret(step, Secret::Password).await?;
                    sent_password = true;
                    step = "password";
                }
                Signal::Denied => return Err(self.rejected(step)),
                Signal::Prompt(mode) => {
                    self.context.set_prompt(found.matched.trim());
                    self.set_mode(mode);
                    info!("{}: logged in at {}", self.context.host, mode);
                    return Ok(mode);
                }
                _ => {}
            }
        }
    }

    /// Escalate from user exec to privileged exec.
    ///
    /// A no-op when already privileged. On failure any pending password
    /// prompt is answered with empty input until user exec returns.
    pub async fn enter_privileged(&mut self) -> Result<()> {
        let command = self.dialect.enable_command.clone();
        self.require_live(&command)?;
        match self.mode() {
            Mode::PrivilegedExec => return Ok(()),
            Mode::UserExec => {}
            mode => {
                return Err(SessionError::WrongMode {
                    step: command,
                    expected: Mode::UserExec,
                    mode,
                }
                .into());
            }
        }

        self.context.begin_command();
        let timeout = self.settings.command_timeout;
        self.send(&command, &command).await?;
        let mut step = command;
        let mut sent_secret = false;

        loop {
            let (signal, found) = self.expect(&step, Wait::Enable, timeout, Phase::Command).await?;
            match signal {
                Signal::Password if !sent_secret => {
                    if self.context.credentials.enable_secret.is_none() {
                        warn!(
                            "{}: device asks for an enable secret but none is configured",
                            self.context.host
                        );
                        self.recover_user_exec(&step, true).await?;
                        return Err(SessionError::EnableSecretRequired {
                            step,
                            mode: self.mode(),
                        }
                        .into());
                    }
                    self.send_secret(&step, Secret::Enable).await?;
                    sent_secret = true;
                    step = "enable secret".to_string();
                }
                Signal::Password => {
                    self.recover_user_exec(&step, true).await?;
                    return Err(self.enable_denied(step));
                }
                Signal::Denied => {
                    self.recover_user_exec(&step, false).await?;
                    return Err(self.enable_denied(step));
                }
                Signal::Prompt(Mode::PrivilegedExec) => {
                    self.context.set_prompt(found.matched.trim());
                    self.set_mode(Mode::PrivilegedExec);
                    return Ok(());
                }
                Signal::Prompt(Mode::UserExec) => {
                    self.context.set_prompt(found.matched.trim());
                    self.set_mode(Mode::UserExec);
                    return Err(self.enable_denied(step));
                }
                Signal::Prompt(mode) => {
                    let prompt = found.matched.trim().to_string();
                    self.context.set_prompt(&prompt);
                    self.set_mode(mode);
                    return Err(SessionError::ConfigModeFailed {
                        step,
                        expected: Mode::PrivilegedExec,
                        mode,
                        prompt,
                    }
                    .into());
                }
                _ => {}
            }
        }
    }

    /// Enter global configuration from privileged exec.
    pub async fn enter_config(&mut self) -> Result<()> {
        let command = self.dialect.config_command.clone();
        self.require(&command, Mode::PrivilegedExec)?;
        self.transition(&command, Mode::GlobalConfig).await
    }

    /// Enter a configuration sub-mode from global configuration.
    pub async fn enter_submode(&mut self, kind: SubMode, command: &str) -> Result<()> {
        self.require(command, Mode::GlobalConfig)?;
        self.transition(command, Mode::SubConfig(kind)).await
    }

    /// Walk back to a shallower mode one level at a time.
    ///
    /// Issues exactly `depth(current) - depth(target)` commands and confirms
    /// the prompt after each.
    pub async fn exit_to(&mut self, target: Mode) -> Result<()> {
        let step = format!("exit to {}", target);
        self.require_live(&step)?;
        let current = self.mode();
        let path = current
            .path_up_to(target)
            .ok_or_else(|| SessionError::WrongMode {
                step: step.clone(),
                expected: target,
                mode: current,
            })?;

        for next in path {
            let command = self
                .dialect
                .deescalate_command(self.mode())
                .map(str::to_string)
                .ok_or_else(|| SessionError::WrongMode {
                    step: step.clone(),
                    expected: target,
                    mode: self.mode(),
                })?;
            self.transition(&command, next).await?;
        }
        Ok(())
    }

    /// Send a command that must be issued from `mode` and collect its output.
    ///
    /// Pagination markers are answered until the prompt appears. The mode is
    /// updated from that prompt, since some commands move the device. Device
    /// error strings mark the result as failed without raising.
    pub async fn run_command(&mut self, command: &str, mode: Mode) -> Result<CommandResult> {
        self.require(command, mode)?;
        self.context.begin_command();
        let timeout = self.settings.command_timeout;
        let start = Instant::now();

        self.send(command, command).await?;
        let drained = self.drain_to_prompt(command, timeout).await?;
        self.context.set_prompt(&drained.prompt);
        self.set_mode(drained.mode);

        let output = strip_echo(&drained.text, command);
        let failure = self.dialect.detect_failure(&output).map(str::to_string);
        if let Some(message) = &failure {
            warn!("{}: '{}' rejected: {}", self.context.host, command, message);
        }

        let result = CommandResult::new(
            command,
            output,
            drained.raw,
            drained.prompt,
            drained.mode,
            drained.pages,
            start.elapsed(),
            failure,
        );
        self.emit(&result);
        Ok(result)
    }

    /// Run a catalog query.
    pub async fn run_query(
        &mut self,
        query: &Query,
        params: &[(&str, &str)],
    ) -> Result<CommandResult> {
        let command = query.render(params)?;
        self.run_command(&command, query.mode).await
    }

    /// Fetch the running configuration.
    pub async fn running_config(&mut self) -> Result<CommandResult> {
        self.run_command("show running-config", Mode::PrivilegedExec)
            .await
    }

    /// Fetch the startup configuration.
    pub async fn startup_config(&mut self) -> Result<CommandResult> {
        self.run_command("show startup-config", Mode::PrivilegedExec)
            .await
    }

    /// Apply a template step by step.
    ///
    /// Placeholders are filled in before anything is sent. The first failing
    /// step aborts the rest; steps already applied are not rolled back.
    pub async fn apply_template(
        &mut self,
        template: &Template,
        params: &[(&str, &str)],
    ) -> Result<Vec<CommandResult>> {
        let rendered = template.render(params)?;
        info!(
            "{}: applying '{}' ({} steps)",
            self.context.host,
            rendered.name,
            rendered.steps.len()
        );

        let mut results = Vec::new();
        for (index, step) in rendered.steps.iter().enumerate() {
            debug!("{}: step {} '{}'", self.context.host, index, step);
            if let Err(source) = self.apply_step(step, &mut results).await {
                warn!(
                    "{}: '{}' stopped at step {} ('{}'): {}",
                    self.context.host, rendered.name, index, step, source
                );
                return Err(TemplateError::StepFailed {
                    template: rendered.name.clone(),
                    index,
                    step: step.to_string(),
                    source: Box::new(source),
                }
                .into());
            }
        }
        Ok(results)
    }

    async fn apply_step(
        &mut self,
        step: &TemplateStep,
        results: &mut Vec<CommandResult>,
    ) -> Result<()> {
        match step {
            TemplateStep::EnterConfig => self.enter_config().await,
            TemplateStep::EnterSubmode { kind, command } => self.enter_submode(*kind, command).await,
            TemplateStep::Command { text, mode } => {
                let result = self.run_command(text, *mode).await?;
                if let Some(message) = result.failure_message() {
                    return Err(TemplateError::CommandRejected {
                        command: text.clone(),
                        message: message.to_string(),
                    }
                    .into());
                }
                results.push(result);
                Ok(())
            }
            TemplateStep::ConfirmHostname { hostname } => {
                let prompt = self.context.prompt();
                if prompt_hostname(prompt) != hostname {
                    return Err(TemplateError::HostnameUnconfirmed {
                        hostname: hostname.clone(),
                        prompt: prompt.to_string(),
                    }
                    .into());
                }
                self.context.target_hostname = Some(hostname.clone());
                Ok(())
            }
            TemplateStep::ExitTo { mode } => self.exit_to(*mode).await,
            TemplateStep::Persist => {
                results.push(self.persist().await?);
                Ok(())
            }
        }
    }

    /// Save the running configuration.
    ///
    /// Questions are answered with a bare return. Succeeds only once the
    /// confirmation text has been seen ahead of the privileged prompt.
    pub async fn persist(&mut self) -> Result<CommandResult> {
        let command = self.dialect.persist_command.clone();
        self.require(&command, Mode::PrivilegedExec)?;
        self.context.begin_command();
        let timeout = self.settings.persist_timeout;
        let start = Instant::now();

        self.send(&command, &command).await?;
        let mut confirmed = false;
        let mut text = String::new();
        let mut raw = String::new();
        let mut pages = 1;

        loop {
            let (signal, found) = self.expect(&command, Wait::Persist, timeout, Phase::Command).await?;
            text.push_str(&found.before);
            raw.push_str(&found.before);
            match signal {
                Signal::Question => {
                    debug!("{}: answering '{}'", self.context.host, found.matched.trim());
                    text.push_str(&found.matched);
                    raw.push_str(&found.matched);
                    self.send(&command, "").await?;
                }
                Signal::Confirmed => {
                    confirmed = true;
                    text.push_str(&found.matched);
                    raw.push_str(&found.matched);
                }
                Signal::More => {
                    raw.push_str(&found.matched);
                    pages += 1;
                    self.send_continue(&command).await?;
                }
                Signal::Prompt(mode) => {
                    let prompt = found.matched.trim().to_string();
                    self.context.set_prompt(&prompt);
                    self.set_mode(mode);
                    if !confirmed {
                        warn!("{}: '{}' returned without confirmation", self.context.host, command);
                        return Err(SessionError::PersistUnconfirmed {
                            step: command,
                            mode,
                        }
                        .into());
                    }
                    info!("{}: configuration saved", self.context.host);
                    let result = CommandResult::new(
                        &command,
                        strip_echo(&text, &command),
                        raw,
                        prompt,
                        mode,
                        pages,
                        start.elapsed(),
                        None,
                    );
                    self.emit(&result);
                    return Ok(result);
                }
                _ => {}
            }
        }
    }

    /// Leave configuration, end the CLI session and close the transport.
    pub async fn logout(&mut self) -> Result<()> {
        if self.mode() == Mode::Disconnected {
            return Ok(());
        }
        if self.mode().is_config() {
            self.exit_to(Mode::PrivilegedExec).await?;
        }
        if self.mode().is_interactive() {
            let command = self.dialect.logout_command.clone();
            self.send(&command, &command).await?;
        }
        self.close().await
    }

    /// Close the transport without logging out.
    pub async fn close(&mut self) -> Result<()> {
        let result = self.transport.close().await;
        self.set_mode(Mode::Disconnected);
        debug!("{}: session closed", self.context.host);
        result
    }

    /// Read output until a prompt, answering pagination markers.
    ///
    /// The continue keystroke is only ever sent in reply to a marker, never
    /// after the prompt has appeared.
    async fn drain_to_prompt(&mut self, step: &str, timeout: Duration) -> Result<Drained> {
        let mut text = String::new();
        let mut raw = String::new();
        let mut pages = 1;

        loop {
            let (signal, found) = self.expect(step, Wait::Output, timeout, Phase::Command).await?;
            text.push_str(&found.before);
            raw.push_str(&found.before);
            match signal {
                Signal::More => {
                    raw.push_str(&found.matched);
                    pages += 1;
                    self.send_continue(step).await?;
                }
                Signal::Prompt(mode) => {
                    return Ok(Drained {
                        text,
                        raw,
                        prompt: found.matched.trim().to_string(),
                        mode,
                        pages,
                    });
                }
                _ => {}
            }
        }
    }

    /// Send a mode-changing command and confirm the prompt that follows.
    async fn transition(&mut self, command: &str, expected: Mode) -> Result<()> {
        self.context.begin_command();
        let timeout = self.settings.command_timeout;
        self.send(command, command).await?;
        let drained = self.drain_to_prompt(command, timeout).await?;
        self.context.set_prompt(&drained.prompt);
        self.set_mode(drained.mode);

        if drained.mode != expected {
            warn!(
                "{}: '{}' landed in {} instead of {}",
                self.context.host, command, drained.mode, expected
            );
            return Err(SessionError::ConfigModeFailed {
                step: command.to_string(),
                expected,
                mode: drained.mode,
                prompt: drained.prompt,
            }
            .into());
        }
        Ok(())
    }

    /// Answer pending password prompts with empty input until an exec
    /// prompt returns, at most `password_retries` times.
    async fn recover_user_exec(&mut self, step: &str, mut answer: bool) -> Result<()> {
        let timeout = self.settings.command_timeout;
        let mut answered = 0;

        loop {
            if answer {
                if answered == self.dialect.password_retries {
                    warn!(
                        "{}: still at a password prompt after {} empty answers",
                        self.context.host, answered
                    );
                    return Ok(());
                }
                self.send(step, "").await?;
                answered += 1;
            }
            let (signal, found) = self.expect(step, Wait::Enable, timeout, Phase::Command).await?;
            match signal {
                Signal::Password => answer = true,
                Signal::Prompt(mode) => {
                    self.context.set_prompt(found.matched.trim());
                    self.set_mode(mode);
                    return Ok(());
                }
                _ => answer = false,
            }
        }
    }

    /// Wait for one of the patterns of `wait`.
    async fn expect(
        &mut self,
        step: &str,
        wait: Wait,
        timeout: Duration,
        phase: Phase,
    ) -> Result<(Signal, ReadMatch)> {
        let expect = match wait {
            Wait::Login => &self.waits.login,
            Wait::Enable => &self.waits.enable,
            Wait::Output => &self.waits.output,
            Wait::Persist => &self.waits.persist,
        };

        let found = match self.transport.read_until(&expect.patterns, timeout).await {
            Ok(found) => found,
            Err(e) => return Err(self.read_failure(e, step, timeout, phase)),
        };
        // One call, so a secret echoed just ahead of the match is masked whole.
        self.context.record(&format!("{}{}", found.before, found.matched));

        let signal = match expect.signals[found.index] {
            // The winning pattern only says where a prompt is; the
            // grammar's guards decide which mode it belongs to.
            Signal::Prompt(mode) => {
                Signal::Prompt(self.dialect.prompts.classify(&found.matched).unwrap_or(mode))
            }
            other => other,
        };
        trace!("{}: {:?} on {:?}", self.context.host, signal, found.matched);
        Ok((signal, found))
    }

    fn read_failure(&mut self, error: Error, step: &str, timeout: Duration, phase: Phase) -> Error {
        let mode = self.mode();
        let step = step.to_string();
        match error {
            Error::Channel(ChannelError::PatternTimeout(_)) => match phase {
                Phase::Login => SessionError::AuthTimeout {
                    step,
                    mode,
                    timeout,
                }
                .into(),
                Phase::Command => SessionError::CommandTimeout {
                    step,
                    mode,
                    timeout,
                }
                .into(),
            },
            Error::Channel(ChannelError::Closed) => {
                warn!("{}: stream closed during '{}'", self.context.host, step);
                self.set_mode(Mode::Disconnected);
                match phase {
                    Phase::Login => SessionError::SessionClosed { step, mode }.into(),
                    Phase::Command => SessionError::UnexpectedEof { step, mode }.into(),
                }
            }
            other => other,
        }
    }

    /// Send one line of input.
    async fn send(&mut self, step: &str, text: &str) -> Result<()> {
        debug!("{}: send {:?}", self.context.host, text);
        self.context.record(text);
        self.context.record("\n");
        let line = format!("{}{}", text, self.dialect.return_char);
        self.write(step, line.as_bytes()).await
    }

    /// Send a credential; only the placeholder reaches logs and transcripts.
    async fn send_secret(&mut self, step: &str, which: Secret) -> Result<()> {
        let credentials = &self.context.credentials;
        let secret = match which {
            Secret::Password => Some(&credentials.password),
            Secret::Enable => credentials.enable_secret.as_ref(),
        };
        let Some(line) = secret.map(|s| format!("{}{}", s.expose_secret(), self.dialect.return_char))
        else {
            return Err(SessionError::EnableSecretRequired {
                step: step.to_string(),
                mode: self.mode(),
            }
            .into());
        };

        debug!("{}: send {}", self.context.host, HIDDEN);
        self.context.record(HIDDEN);
        self.context.record("\n");
        self.write(step, line.as_bytes()).await
    }

    async fn send_continue(&mut self, step: &str) -> Result<()> {
        trace!("{}: continue", self.context.host);
        let keystroke = self.dialect.continue_keystroke.clone();
        self.write(step, keystroke.as_bytes()).await
    }

    async fn write(&mut self, step: &str, data: &[u8]) -> Result<()> {
        match self.transport.write(data).await {
            Ok(()) => Ok(()),
            Err(Error::Channel(ChannelError::Closed)) => {
                let mode = self.mode();
                self.set_mode(Mode::Disconnected);
                Err(SessionError::SessionClosed {
                    step: step.to_string(),
                    mode,
                }
                .into())
            }
            Err(e) => Err(e),
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        let previous = self.context.mode();
        if previous != mode {
            debug!("{}: {} -> {}", self.context.host, previous, mode);
            self.context.set_mode(mode);
        }
    }

    fn emit(&mut self, result: &CommandResult) {
        if let Some(sink) = self.sink.as_mut() {
            sink.accept(result);
        }
    }

    fn require_live(&self, step: &str) -> Result<()> {
        if self.mode() == Mode::Disconnected {
            return Err(SessionError::SessionClosed {
                step: step.to_string(),
                mode: Mode::Disconnected,
            }
            .into());
        }
        Ok(())
    }

    /// Fail with `WrongMode` unless the device is in `expected`; nothing is written.
    fn require(&self, step: &str, expected: Mode) -> Result<()> {
        self.require_live(step)?;
        let mode = self.mode();
        if mode != expected {
            return Err(SessionError::WrongMode {
                step: step.to_string(),
                expected,
                mode,
            }
            .into());
        }
        Ok(())
    }

    fn rejected(&self, step: &str) -> Error {
        warn!("{}: login rejected at '{}'", self.context.host, step);
        SessionError::AuthRejected {
            step: step.to_string(),
            mode: self.mode(),
        }
        .into()
    }

    fn enable_denied(&self, step: String) -> Error {
        warn!("{}: enable denied", self.context.host);
        SessionError::EnableDenied {
            step,
            mode: self.mode(),
        }
        .into()
    }
}

/// Drop the device's echo of `command` from the start of `text`.
fn strip_echo(text: &str, command: &str) -> String {
    let trimmed = text.trim_start_matches('\n');
    match trimmed.split_once('\n') {
        Some((first, rest)) if first.trim() == command.trim() => rest.to_string(),
        None if trimmed.trim() == command.trim() => String::new(),
        _ => text.to_string(),
    }
}

/// The hostname part of a prompt such as `R1(config)#`.
fn prompt_hostname(prompt: &str) -> &str {
    let end = prompt.find(['(', '>', '#']).unwrap_or(prompt.len());
    &prompt[..end]
}
