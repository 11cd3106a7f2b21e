//! Countdown Timer CLI - a drift-corrected terminal countdown
//!
//! The remaining time is always computed from the clock, so the display
//! stays accurate however irregular the redraw ticks are.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::io::BufReader;
use tokio::time::{interval, MissedTickBehavior};

use countdown::cli::{shell, Cli, Commands, Display, RunArgs};
use countdown::{CountdownEvent, TimeRemaining, TokioCountdown};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => {
            run_countdown(args).await?;
        }
        Some(Commands::Shell(args)) => {
            let config = args.to_config();
            let engine =
                TokioCountdown::with_tokio(config).context("Failed to create countdown engine")?;
            Display::show_title(config.whole_minutes());
            Display::show_shell_help();
            shell::run_shell(engine, BufReader::new(tokio::io::stdin())).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Runs one countdown to completion, redrawing the clock face as it changes.
///
/// Ctrl-C pauses the countdown and exits after reporting the time left.
async fn run_countdown(args: RunArgs) -> Result<()> {
    let config = args.duration.to_config();
    let engine =
        TokioCountdown::with_tokio(config).context("Failed to create countdown engine")?;
    let mut events = engine.subscribe();

    if !args.quiet {
        Display::show_title(config.whole_minutes());
    }
    engine.start()?;

    let mut redraw = interval(Duration::from_millis(config.heartbeat_interval_ms));
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shown: Option<TimeRemaining> = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(CountdownEvent::Finished) | None => break,
                Some(_) => {}
            },
            _ = redraw.tick() => {
                let time = engine.time_remaining();
                if !args.quiet && shown != Some(time) {
                    Display::show_clock_face(time).context("Failed to draw clock face")?;
                    shown = Some(time);
                }
            }
            signal = &mut ctrl_c => {
                signal.context("Failed to listen for Ctrl-C")?;
                engine.pause()?;
                println!();
                Display::show_pause_success(&engine.snapshot());
                engine.dispose();
                return Ok(());
            }
        }
    }

    if !args.quiet {
        Display::show_clock_face(engine.time_remaining())
            .context("Failed to draw clock face")?;
        println!();
    }
    Display::show_finished();
    engine.dispose();
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use countdown::cli::DurationArgs;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["countdown"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["countdown", "run", "--duration-ms", "300"]);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.duration.to_config().duration_ms, 300);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_verbose() {
        let cli = Cli::parse_from(["countdown", "--verbose", "shell"]);
        assert!(cli.verbose);
    }

    #[tokio::test]
    async fn test_run_countdown_short_duration() {
        let args = RunArgs {
            duration: DurationArgs {
                duration_ms: Some(50),
                interval_ms: 10,
                ..DurationArgs::default()
            },
            quiet: true,
        };

        let result = tokio::time::timeout(Duration::from_secs(5), run_countdown(args)).await;

        assert!(result.is_ok(), "countdown should finish well within 5s");
        assert!(result.unwrap().is_ok());
    }
}
