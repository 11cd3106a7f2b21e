//! Command definitions for the countdown timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

use crate::types::{CountdownConfig, DEFAULT_HEARTBEAT_INTERVAL_MS};

// ============================================================================
// CLI Structure
// ============================================================================

/// Countdown Timer CLI - a drift-corrected terminal countdown
#[derive(Parser, Debug)]
#[command(
    name = "countdown",
    version,
    about = "ドリフト補正付きカウントダウンタイマー",
    long_about = "ターミナル上で動作するシンプルなカウントダウンタイマー。\n\
                  経過時間は実時間から計算されるため、長時間動かしても表示がずれません。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a countdown and show it until it finishes
    Run(RunArgs),

    /// Control a countdown with start/pause/reset commands read from stdin
    Shell(DurationArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Arguments
// ============================================================================

/// Countdown length and heartbeat interval
#[derive(Args, Debug, Clone)]
pub struct DurationArgs {
    /// Countdown length in minutes (0-1440)
    #[arg(
        short,
        long,
        default_value = "5",
        conflicts_with_all = ["seconds", "duration_ms"],
        value_parser = clap::value_parser!(u64).range(0..=1440)
    )]
    pub minutes: u64,

    /// Countdown length in seconds (0-86400)
    #[arg(
        short,
        long,
        conflicts_with = "duration_ms",
        value_parser = clap::value_parser!(u64).range(0..=86_400)
    )]
    pub seconds: Option<u64>,

    /// Countdown length in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=86_400_000))]
    pub duration_ms: Option<u64>,

    /// Heartbeat interval in milliseconds (1-60000)
    #[arg(
        short,
        long,
        default_value = "100",
        value_parser = clap::value_parser!(u64).range(1..=60_000)
    )]
    pub interval_ms: u64,
}

impl Default for DurationArgs {
    fn default() -> Self {
        Self {
            minutes: 5,
            seconds: None,
            duration_ms: None,
            interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
        }
    }
}

impl DurationArgs {
    /// Builds the engine configuration. The most precise unit given wins.
    pub fn to_config(&self) -> CountdownConfig {
        let config = CountdownConfig::default().with_heartbeat_interval_ms(self.interval_ms);
        match (self.duration_ms, self.seconds) {
            (Some(ms), _) => config.with_duration_ms(ms),
            (None, Some(seconds)) => config.with_seconds(seconds),
            (None, None) => config.with_minutes(self.minutes),
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub duration: DurationArgs,

    /// Only print the final message
    #[arg(short, long)]
    pub quiet: bool,
}

// ============================================================================
// Tests
// ============================================================================
