//! Display utilities for the countdown timer CLI.
//!
//! This module provides formatted output for:
//! - The clock face
//! - Command confirmations
//! - Status display
//! - Error messages

use std::io::{self, Write};

use crate::types::{CountdownSnapshot, CountdownStatus, TimeRemaining};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the timer title for the configured length.
    pub fn show_title(whole_minutes: u64) {
        println!("{}", Self::title(whole_minutes));
    }

    /// Redraws the clock face in place.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be flushed.
    pub fn show_clock_face(time: TimeRemaining) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "\r{}", Self::clock_face(time))?;
        stdout.flush()
    }

    /// Shows a message for timer start.
    pub fn show_start_success(snapshot: &CountdownSnapshot) {
        println!("* タイマーを開始しました");
        println!("  残り時間: {}", snapshot.time_remaining());
    }

    /// Shows a message for timer pause.
    pub fn show_pause_success(snapshot: &CountdownSnapshot) {
        println!("|| タイマーを一時停止しました");
        println!("  残り時間: {}", snapshot.time_remaining());
    }

    /// Shows a message for timer reset.
    pub fn show_reset_success(snapshot: &CountdownSnapshot) {
        println!("<> タイマーをリセットしました");
        println!("  残り時間: {}", snapshot.time_remaining());
    }

    /// Shows a message for a new countdown length.
    pub fn show_configure_success(snapshot: &CountdownSnapshot) {
        println!("* 時間を変更しました");
        println!("  残り時間: {}", snapshot.time_remaining());
    }

    /// Shows the finished notification.
    pub fn show_finished() {
        println!("[] タイマーが終了しました");
    }

    /// Shows the current timer status.
    pub fn show_status(snapshot: &CountdownSnapshot) {
        println!("カウントダウンタイマー ステータス");
        println!("─────────────────────────────");
        println!("状態: {}", Self::status_label(snapshot.status));
        println!("残り時間: {}", snapshot.time_remaining());
        println!(
            "設定時間: {}",
            TimeRemaining::from_ms(snapshot.total_duration_ms)
        );
    }

    /// Shows the shell command reference.
    pub fn show_shell_help() {
        println!("コマンド:");
        println!("  start              タイマーを開始/再開");
        println!("  pause              タイマーを一時停止");
        println!("  reset              タイマーをリセット");
        println!("  status [--json]    現在の状態を表示");
        println!("  configure <分>     時間を変更（停止中のみ）");
        println!("  help               このヘルプを表示");
        println!("  quit               終了");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Title line, e.g. `5分タイマー`.
    fn title(whole_minutes: u64) -> String {
        format!("{}分タイマー", whole_minutes)
    }

    /// Clock face line, e.g. `[ 04:59 ]`.
    fn clock_face(time: TimeRemaining) -> String {
        format!("[ {} ]", time)
    }

    fn status_label(status: CountdownStatus) -> &'static str {
        match status {
            CountdownStatus::Idle => "停止中",
            CountdownStatus::Running => "実行中",
            CountdownStatus::Finished => "終了",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
