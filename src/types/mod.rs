//! Core data types for the countdown timer.
//!
//! This module defines the data structures used for:
//! - Countdown status (the engine's state machine states)
//! - Countdown configuration with validation
//! - The minutes/seconds projection of the remaining time
//! - Serializable engine snapshots

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::error::CountdownError;

// ============================================================================
// Constants
// ============================================================================

/// Default countdown length (5 minutes).
pub const DEFAULT_DURATION_MS: u64 = 5 * MS_PER_MINUTE;

/// Default heartbeat interval. Short relative to one second so the displayed
/// seconds update promptly.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 100;

/// Upper bound accepted for the heartbeat interval.
pub const MAX_HEARTBEAT_INTERVAL_MS: u64 = 60_000;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;

// ============================================================================
// CountdownStatus
// ============================================================================

/// Represents the current state of the countdown engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownStatus {
    /// Not counting down (initial state, and the state after pause/reset)
    #[default]
    Idle,
    /// Counting down on every heartbeat
    Running,
    /// Reached zero; only `reset` leaves this state
    Finished,
}

impl CountdownStatus {
    /// Returns the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            CountdownStatus::Idle => "idle",
            CountdownStatus::Running => "running",
            CountdownStatus::Finished => "finished",
        }
    }

    /// Returns true if the countdown is actively consuming time.
    pub fn is_running(&self) -> bool {
        matches!(self, CountdownStatus::Running)
    }
}

impl fmt::Display for CountdownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CountdownConfig
// ============================================================================

/// Configuration for a countdown engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// Countdown length in milliseconds
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    /// Heartbeat interval in milliseconds (1-60000)
    #[serde(rename = "heartbeatIntervalMs")]
    pub heartbeat_interval_ms: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
        }
    }
}

impl CountdownConfig {
    /// Creates a new configuration with the specified length in whole minutes.
    pub fn with_minutes(mut self, minutes: u64) -> Self {
        self.duration_ms = minutes.saturating_mul(MS_PER_MINUTE);
        self
    }

    /// Creates a new configuration with the specified length in seconds.
    pub fn with_seconds(mut self, seconds: u64) -> Self {
        self.duration_ms = seconds.saturating_mul(MS_PER_SECOND);
        self
    }

    /// Creates a new configuration with the specified length in milliseconds.
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Creates a new configuration with the specified heartbeat interval.
    pub fn with_heartbeat_interval_ms(mut self, interval_ms: u64) -> Self {
        self.heartbeat_interval_ms = interval_ms;
        self
    }

    /// Whole minutes of the configured length, as shown in the timer title.
    pub fn whole_minutes(&self) -> u64 {
        self.duration_ms / MS_PER_MINUTE
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::InvalidConfiguration` if the heartbeat
    /// interval is outside 1-60000 ms.
    pub fn validate(&self) -> Result<(), CountdownError> {
        if self.heartbeat_interval_ms < 1 || self.heartbeat_interval_ms > MAX_HEARTBEAT_INTERVAL_MS
        {
            return Err(CountdownError::InvalidConfiguration(format!(
                "ハートビート間隔は1-{}ミリ秒の範囲で指定してください",
                MAX_HEARTBEAT_INTERVAL_MS
            )));
        }
        Ok(())
    }
}

// ============================================================================
// TimeRemaining
// ============================================================================

/// Minutes/seconds projection of a remaining duration.
///
/// Both fields are truncated, never rounded: 59_999 ms is `00:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    /// Whole minutes (unbounded)
    pub minutes: u64,
    /// Seconds within the minute (0-59)
    pub seconds: u64,
}

impl TimeRemaining {
    /// Projects a millisecond count onto minutes and seconds.
    pub fn from_ms(remaining_ms: u64) -> Self {
        Self {
            minutes: remaining_ms / MS_PER_MINUTE,
            seconds: (remaining_ms / MS_PER_SECOND) % 60,
        }
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            format_time_segment(self.minutes),
            format_time_segment(self.seconds)
        )
    }
}

/// Zero-pads a clock segment to at least two digits.
pub fn format_time_segment(value: u64) -> String {
    format!("{:02}", value)
}

// ============================================================================
// CountdownSnapshot
// ============================================================================

/// Point-in-time view of a countdown engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    /// Current status
    pub status: CountdownStatus,
    /// Remaining milliseconds
    #[serde(rename = "remainingMs")]
    pub remaining_ms: u64,
    /// Configured countdown length in milliseconds
    #[serde(rename = "totalDurationMs")]
    pub total_duration_ms: u64,
}

impl CountdownSnapshot {
    /// Returns the minutes/seconds projection of the remaining time.
    pub fn time_remaining(&self) -> TimeRemaining {
        TimeRemaining::from_ms(self.remaining_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================
