//! CLI interface for nwspeaker
//!
//! Argument parsing and the subcommand implementations behind the
//! `nwspeaker` binary.

pub mod args;
pub mod commands;

pub use args::{ArpOp, Cli, Commands};
pub use commands::run;
