//! Interactive shell for the countdown timer.
//!
//! Reads one command per line (`start`, `pause`, `reset`, `status`,
//! `configure <minutes>`, `help`, `quit`) and applies it to an engine,
//! printing the finished notification as soon as it arrives.

use std::str::FromStr;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use super::display::Display;
use crate::engine::{Clock, CountdownEngine, CountdownEvent, Scheduler};

/// Upper bound for `configure`, matching the CLI flag.
const MAX_CONFIGURE_MINUTES: u64 = 1440;

// ============================================================================
// ShellCommand
// ============================================================================

/// A parsed shell line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset to the configured length
    Reset,
    /// Print the current status
    Status {
        /// Print the snapshot as JSON
        json: bool,
    },
    /// Change the countdown length
    Configure {
        /// New length in minutes
        minutes: u64,
    },
    /// Print the command reference
    Help,
    /// Leave the shell
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words
            .next()
            .ok_or_else(|| "コマンドが空です".to_string())?
            .to_ascii_lowercase();

        let command = match name.as_str() {
            "start" => ShellCommand::Start,
            "pause" => ShellCommand::Pause,
            "reset" => ShellCommand::Reset,
            "status" => match words.next() {
                None => ShellCommand::Status { json: false },
                Some("--json") => ShellCommand::Status { json: true },
                Some(other) => return Err(format!("不明なオプションです: {}", other)),
            },
            "configure" => {
                let minutes = words
                    .next()
                    .ok_or_else(|| "分数を指定してください".to_string())
                    .and_then(parse_minutes)?;
                ShellCommand::Configure { minutes }
            }
            "help" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("不明なコマンドです: {}", other)),
        };

        if let Some(extra) = words.next() {
            return Err(format!("余分な引数があります: {}", extra));
        }
        Ok(command)
    }
}

/// Validates a `configure` argument.
fn parse_minutes(s: &str) -> Result<u64, String> {
    let minutes: u64 = s
        .parse()
        .map_err(|_| format!("分数は0以上の整数で指定してください: {}", s))?;
    if minutes > MAX_CONFIGURE_MINUTES {
        return Err(format!(
            "分数は0-{}の範囲で指定してください",
            MAX_CONFIGURE_MINUTES
        ));
    }
    Ok(minutes)
}

// ============================================================================
// Execution
// ============================================================================

/// Whether the shell should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellOutcome {
    /// Read the next line
    Continue,
    /// Stop reading
    Quit,
}

/// Applies one command to the engine and prints the result.
///
/// # Errors
///
/// Returns an error if the engine rejects the command.
pub fn execute<C, S>(engine: &CountdownEngine<C, S>, command: ShellCommand) -> Result<ShellOutcome>
where
    C: Clock + 'static,
    S: Scheduler + 'static,
{
    debug!(?command, "Executing shell command");

    match command {
        ShellCommand::Start => {
            engine.start()?;
            Display::show_start_success(&engine.snapshot());
        }
        ShellCommand::Pause => {
            engine.pause()?;
            Display::show_pause_success(&engine.snapshot());
        }
        ShellCommand::Reset => {
            engine.reset()?;
            Display::show_reset_success(&engine.snapshot());
        }
        ShellCommand::Status { json: false } => {
            Display::show_status(&engine.snapshot());
        }
        ShellCommand::Status { json: true } => {
            let json = serde_json::to_string(&engine.snapshot())
                .context("Failed to serialize countdown snapshot")?;
            println!("{}", json);
        }
        ShellCommand::Configure { minutes } => {
            engine.configure(minutes.saturating_mul(60_000))?;
            Display::show_configure_success(&engine.snapshot());
        }
        ShellCommand::Help => Display::show_shell_help(),
        ShellCommand::Quit => return Ok(ShellOutcome::Quit),
    }

    Ok(ShellOutcome::Continue)
}

/// Runs the shell until `quit` or end of input, then disposes the engine.
///
/// Bad lines and rejected commands are reported and the shell keeps going.
///
/// # Errors
///
/// Returns an error if reading the input fails.
pub async fn run_shell<C, S, R>(engine: CountdownEngine<C, S>, input: R) -> Result<()>
where
    C: Clock + 'static,
    S: Scheduler + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut events = engine.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read command")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let outcome = match line.parse::<ShellCommand>() {
                    Ok(command) => execute(&engine, command),
                    Err(message) => {
                        Display::show_error(&message);
                        Ok(ShellOutcome::Continue)
                    }
                };
                drain_events(&mut events);

                match outcome {
                    Ok(ShellOutcome::Quit) => break,
                    Ok(ShellOutcome::Continue) => {}
                    Err(e) => Display::show_error(&e.to_string()),
                }
            }
            Some(event) = events.recv() => show_event(event),
        }
    }

    engine.dispose();
    Ok(())
}

fn drain_events(events: &mut mpsc::UnboundedReceiver<CountdownEvent>) {
    while let Ok(event) = events.try_recv() {
        show_event(event);
    }
}

fn show_event(event: CountdownEvent) {
    if event == CountdownEvent::Finished {
        Display::show_finished();
    }
}

// ============================================================================
// Tests
// ============================================================================
