//! Session layer: the interactive CLI automaton and its state.
//!
//! A session moves a device along the mode ladder
//! (`user exec -> privileged exec -> configuration -> sub-mode`), sends
//! commands, drains paginated output and saves the configuration. Every
//! step is confirmed by the prompt the device prints.

mod automaton;
mod builder;
mod context;
mod result;
mod settings;
mod sink;

pub use automaton::SessionAutomaton;
pub use builder::SessionBuilder;
pub use context::{Credentials, HIDDEN, SessionContext, Transcript};
pub use result::CommandResult;
pub use settings::SessionSettings;
pub use sink::{LogSink, ResultSink};
