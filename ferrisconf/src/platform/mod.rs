//! Dialect definitions: CLI modes, prompt grammar, mode-transition commands.
//!
//! The session automaton is vendor-agnostic; everything device-specific it
//! needs is described by a [`Dialect`].

mod dialect;
mod mode;
mod prompt;
pub mod vendors;

pub use dialect::Dialect;
pub use mode::{Mode, SubMode};
pub use prompt::{ModePrompt, PromptSpec};
