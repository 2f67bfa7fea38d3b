//! Connection settings for the SSH and telnet transports.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// What to do with the key a server presents, like OpenSSH's
/// `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Only connect to hosts already listed in known_hosts.
    Strict,

    /// Record keys of hosts seen for the first time; refuse keys that changed.
    #[default]
    AcceptNew,

    /// Trust every key. Lab routers only.
    Disabled,
}

/// How the SSH layer proves who we are.
#[derive(Debug)]
pub enum AuthMethod {
    /// Skip SSH authentication; the router asks for credentials on the
    /// console instead.
    None,

    /// Login password.
    Password(SecretString),

    /// Key file on disk.
    PrivateKey {
        /// Location of the key.
        path: PathBuf,
        /// Passphrase, when the key is encrypted.
        passphrase: Option<SecretString>,
    },
}

/// Everything needed to open an SSH shell on a router.
#[derive(Debug)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,

    /// Bounds the TCP connect and handshake, and idle time afterward.
    pub timeout: Duration,

    /// PTY columns. Wide enough that routers do not wrap long lines.
    pub terminal_width: u32,

    /// PTY rows.
    pub terminal_height: u32,

    pub host_key_verification: HostKeyVerification,

    /// known_hosts file to use instead of `~/.ssh/known_hosts`.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Port 22, no SSH authentication, 30 second timeout.
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            auth: AuthMethod::None,
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// `host:port`, for logging.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where to open a telnet connection.
#[derive(Debug, Clone)]
pub struct TelnetConfig {
    pub host: String,
    pub port: u16,

    /// Bounds the TCP connect.
    pub timeout: Duration,
}

impl TelnetConfig {
    /// Port 23, 30 second timeout.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 23,
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_defaults() {
        let config = SshConfig::new("10.0.0.1", "admin");
        assert_eq!(config.socket_addr(), "10.0.0.1:22");
        assert!(matches!(config.auth, AuthMethod::None));
        assert!(matches!(
            config.host_key_verification,
            HostKeyVerification::AcceptNew
        ));
    }

    #[test]
    fn test_telnet_defaults() {
        let config = TelnetConfig::new("r1.lab");
        assert_eq!(config.port, 23);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
