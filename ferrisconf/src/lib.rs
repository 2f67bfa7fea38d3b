//! # Ferrisconf
//!
//! Async expect-style session automaton for configuring routers over an
//! interactive CLI.
//!
//! Ferrisconf drives a device the way an operator at a terminal would: it
//! logs in, escalates with `enable`, walks in and out of configuration modes,
//! drains `--More--` pagination and saves the configuration. Every step is
//! confirmed by matching the prompt the device prints back.
//!
//! ## Features
//!
//! - SSH (via russh), telnet, or any tokio byte stream as the transport
//! - Mode tracking from prompt classification (`>`, `#`, `(config)#`, `(config-if)#`, ...)
//! - Typed errors for every failed step, with the mode the device was left in
//! - Parameterized configuration templates (hostname, loopback, OSPF, EIGRP, RIP)
//! - Concurrent sessions over a fleet of devices
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferrisconf::{Mode, SessionBuilder, catalog};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ferrisconf::Error> {
//!     let mut session = SessionBuilder::new("192.168.1.1")
//!         .username("admin")
//!         .password("cisco")
//!         .enable_secret("class")
//!         .connect_telnet()
//!         .await?;
//!
//!     session.authenticate().await?;
//!     session.enter_privileged().await?;
//!
//!     let catalog = catalog::cisco_ios();
//!     session
//!         .apply_template(catalog.template("hostname")?, &[("hostname", "R1")])
//!         .await?;
//!
//!     let result = session
//!         .run_command("show ip interface brief", Mode::PrivilegedExec)
//!         .await?;
//!     println!("{}", result);
//!
//!     session.logout().await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod channel;
pub mod error;
pub mod fleet;
pub mod platform;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use catalog::{CommandCatalog, Query, Template, TemplateStep};
pub use channel::ExpectChannel;
pub use error::{Error, Result, SessionError, TemplateError};
pub use platform::{Dialect, Mode, ModePrompt, PromptSpec, SubMode};
pub use session::{
    CommandResult, Credentials, LogSink, ResultSink, SessionAutomaton, SessionBuilder,
    SessionContext, SessionSettings,
};
pub use transport::{AuthMethod, RawIo, ReadMatch, SshConfig, TelnetConfig, Transport};
