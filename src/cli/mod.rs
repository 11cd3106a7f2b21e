//! CLI module for the countdown timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic
//! - `shell`: Line-oriented interactive host for the engine

pub mod commands;
pub mod display;
pub mod shell;

pub use commands::{Cli, Commands, DurationArgs, RunArgs};
pub use display::Display;
pub use shell::{ShellCommand, ShellOutcome};
