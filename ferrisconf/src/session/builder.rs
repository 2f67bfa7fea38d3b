//! Builder for creating sessions.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::automaton::SessionAutomaton;
use super::context::{Credentials, SessionContext, duplicate};
use super::settings::SessionSettings;
use super::sink::ResultSink;
use crate::channel::{ChannelConfig, ExpectChannel};
use crate::error::{Result, TransportError};
use crate::platform::Dialect;
use crate::platform::vendors::cisco_ios;
use crate::transport::{
    AuthMethod, HostKeyVerification, SshConfig, SshIo, SshTransport, TelnetConfig, TelnetIo,
    Transport,
};

/// Builder for constructing sessions.
///
/// # Example
///
/// ```rust,no_run
/// use ferrisconf::SessionBuilder;
///
/// # async fn example() -> Result<(), ferrisconf::Error> {
/// let mut session = SessionBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("cisco")
///     .enable_secret("class")
///     .connect_ssh()
///     .await?;
///
/// session.authenticate().await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    host: String,
    port: Option<u16>,
    username: Option<String>,
    password: Option<SecretString>,
    enable_secret: Option<SecretString>,
    private_key: Option<(PathBuf, Option<SecretString>)>,
    dialect: Option<Dialect>,
    settings: SessionSettings,
    timeout: Duration,
    terminal_width: u32,
    terminal_height: u32,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    target_hostname: Option<String>,
    sink: Option<Box<dyn ResultSink>>,
}

impl SessionBuilder {
    /// Create a new session builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            username: None,
            password: None,
            enable_secret: None,
            private_key: None,
            dialect: None,
            settings: SessionSettings::default(),
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            target_hostname: None,
            sink: None,
        }
    }

    /// Set the port (default: 22 for SSH, 23 for telnet).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the login password.
    ///
    /// Used for SSH password authentication and for console login prompts.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set the enable secret.
    pub fn enable_secret(mut self, secret: impl Into<String>) -> Self {
        self.enable_secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Set private key authentication for SSH.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.private_key = Some((key_path.into(), None));
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.private_key = Some((key_path.into(), Some(SecretString::from(passphrase.into()))));
        self
    }

    /// Set the device dialect (default: Cisco IOS).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Set the automaton timeouts and limits.
    pub fn settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the connection timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set terminal dimensions for the SSH PTY.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Set the SSH host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a custom known_hosts file.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Hostname the device is expected to carry.
    pub fn target_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.target_hostname = Some(hostname.into());
        self
    }

    /// Send every command result to `sink`.
    pub fn sink(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Connect over SSH and open a shell.
    pub async fn connect_ssh(self) -> Result<SessionAutomaton<ExpectChannel<SshIo>>> {
        let username = self.username.clone().ok_or_else(|| TransportError::InvalidConfig {
            message: "SSH requires a username".to_string(),
        })?;

        let auth = match (&self.private_key, &self.password) {
            (Some((path, passphrase)), _) => AuthMethod::PrivateKey {
                path: path.clone(),
                passphrase: passphrase.as_ref().map(duplicate),
            },
            (None, Some(password)) => AuthMethod::Password(duplicate(password)),
            (None, None) => AuthMethod::None,
        };

        let mut config = SshConfig::new(self.host.clone(), username);
        config.port = self.port.unwrap_or(22);
        config.auth = auth;
        config.timeout = self.timeout;
        config.terminal_width = self.terminal_width;
        config.terminal_height = self.terminal_height;
        config.host_key_verification = self.host_key_verification.clone();
        config.known_hosts_path = self.known_hosts_path.clone();

        let io = SshTransport::connect(config).await?.open_shell().await?;
        let channel = ExpectChannel::new(io, self.channel_config());
        Ok(self.attach(channel))
    }

    /// Connect over telnet.
    pub async fn connect_telnet(self) -> Result<SessionAutomaton<ExpectChannel<TelnetIo>>> {
        let mut config = TelnetConfig::new(self.host.clone());
        config.port = self.port.unwrap_or(23);
        config.timeout = self.timeout;

        let io = TelnetIo::connect(&config).await?;
        let channel = ExpectChannel::new(io, self.channel_config());
        Ok(self.attach(channel))
    }

    /// Build a session over an already connected transport.
    pub fn attach<T: Transport>(self, transport: T) -> SessionAutomaton<T> {
        let credentials = Credentials {
            username: self.username.unwrap_or_default(),
            password: self
                .password
                .unwrap_or_else(|| SecretString::from(String::new())),
            enable_secret: self.enable_secret,
        };

        let mut context = SessionContext::new(self.host, credentials, self.settings.transcript_limit);
        context.target_hostname = self.target_hostname;

        let dialect = self.dialect.unwrap_or_else(cisco_ios::dialect);
        let session = SessionAutomaton::new(transport, dialect, context, self.settings);
        match self.sink {
            Some(sink) => session.with_sink(sink),
            None => session,
        }
    }

    fn channel_config(&self) -> ChannelConfig {
        ChannelConfig {
            search_depth: self.settings.search_depth,
        }
    }
}
