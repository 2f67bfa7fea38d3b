//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use log::{debug, trace, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::RawIo;
use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::error::{ChannelError, Result, TransportError};

/// SSH transport wrapping the russh client.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    /// Configuration used for this connection.
    config: SshConfig,
}

impl SshTransport {
    /// Connect to the SSH server and authenticate.
    pub async fn connect(config: SshConfig) -> Result<Self> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });

        let rejection = Arc::new(Mutex::new(None));
        let handler = SshHandler {
            known_hosts: KnownHosts {
                host: config.host.clone(),
                port: config.port,
                path: config.known_hosts_path.clone(),
            },
            policy: config.host_key_verification.clone(),
            rejection: Arc::clone(&rejection),
        };

        debug!("ssh: connecting to {}", config.socket_addr());
        let connecting = client::connect(ssh_config, (config.host.as_str(), config.port), handler);
        let mut session = match tokio::time::timeout(config.timeout, connecting).await {
            Err(_) => return Err(TransportError::Timeout(config.timeout).into()),
            Ok(Ok(session)) => session,
            // A refused host key surfaces from russh as a generic error.
            Ok(Err(e)) => {
                let refused = rejection.lock().ok().and_then(|mut slot| slot.take());
                return Err(refused.unwrap_or(TransportError::Ssh(e)).into());
            }
        };

        Self::authenticate(&mut session, &config).await?;

        Ok(Self { session, config })
    }

    /// Open an interactive shell and hand over the connection as raw I/O.
    pub async fn open_shell(self) -> Result<SshIo> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_pty(
                true,
                "vt100",
                self.config.terminal_width,
                self.config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;

        Ok(SshIo {
            session: self.session,
            channel,
        })
    }

    /// Authenticate with the server.
    async fn authenticate(session: &mut Handle<SshHandler>, config: &SshConfig) -> Result<()> {
        let success = match &config.auth {
            AuthMethod::None => session
                .authenticate_none(&config.username)
                .await
                .map_err(TransportError::Ssh)?
                .success(),
            AuthMethod::Password(password) => session
                .authenticate_password(&config.username, password.expose_secret())
                .await
                .map_err(TransportError::Ssh)?
                .success(),
            AuthMethod::PrivateKey { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                    .map_err(|e| TransportError::Key(e.to_string()))?;

                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .map_err(TransportError::Ssh)?
                    .flatten();

                session
                    .authenticate_publickey(
                        &config.username,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await
                    .map_err(TransportError::Ssh)?
                    .success()
            }
        };

        // AuthMethod::None is allowed to fail: the device will then ask on
        // the console and the session automaton answers there.
        if !success && !matches!(config.auth, AuthMethod::None) {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        Ok(())
    }
}

/// An SSH shell channel as [`RawIo`].
pub struct SshIo {
    session: Handle<SshHandler>,
    channel: Channel<Msg>,
}

impl RawIo for SshIo {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.channel
            .data(data)
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => return Ok(Some(Bytes::copy_from_slice(&data))),
                Some(ChannelMsg::ExtendedData { data, .. }) => {
                    return Ok(Some(Bytes::copy_from_slice(&data)));
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => return Ok(None),
                Some(other) => trace!("ssh: ignoring channel message {:?}", other),
            }
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Err(e) = self.channel.eof().await {
            warn!("ssh: failed to send EOF: {}", e);
        }
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// The known_hosts file consulted for one target.
struct KnownHosts {
    host: String,
    port: u16,
    path: Option<PathBuf>,
}

impl KnownHosts {
    /// `Ok(false)` when the host has no entry yet.
    fn lookup(&self, key: &PublicKey) -> std::result::Result<bool, TransportError> {
        let found = match &self.path {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };
        found.map_err(|e| match e {
            russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            },
            other => TransportError::KnownHosts(other.to_string()),
        })
    }

    fn learn(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        let learned = match &self.path {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        };
        learned.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }

    /// Apply `policy` to the key the server presented.
    fn verify(
        &self,
        policy: &HostKeyVerification,
        key: &PublicKey,
    ) -> std::result::Result<(), TransportError> {
        if matches!(policy, HostKeyVerification::Disabled) {
            return Ok(());
        }
        if self.lookup(key)? {
            return Ok(());
        }
        if matches!(policy, HostKeyVerification::Strict) {
            return Err(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            });
        }
        debug!("ssh: learning host key for {}:{}", self.host, self.port);
        if let Err(e) = self.learn(key) {
            warn!("ssh: could not save host key for {}: {}", self.host, e);
        }
        Ok(())
    }
}

/// russh client callbacks.
struct SshHandler {
    known_hosts: KnownHosts,
    policy: HostKeyVerification,
    /// Why the host key was refused, picked up again by `connect`.
    rejection: Arc<Mutex<Option<TransportError>>>,
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.known_hosts.verify(&self.policy, server_public_key) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("ssh: refusing {}: {}", self.known_hosts.host, e);
                if let Ok(mut slot) = self.rejection.lock() {
                    *slot = Some(e);
                }
                Ok(false)
            }
        }
    }
}
