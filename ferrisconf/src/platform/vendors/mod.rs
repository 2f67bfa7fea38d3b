//! Built-in dialect definitions.

pub mod cisco_ios;
