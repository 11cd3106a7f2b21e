//! Countdown engine error types.
//!
//! The taxonomy is narrow: configuration mistakes and lifecycle misuse are
//! reported to the caller. Redundant commands are not errors, and a clock
//! that moves backwards is clamped rather than reported.

use thiserror::Error;

use crate::types::CountdownStatus;

/// Errors that can occur when driving a countdown engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountdownError {
    /// Configuration values are out of range.
    #[error("設定が不正です: {0}")]
    InvalidConfiguration(String),

    /// `configure` was called while the countdown was not idle.
    #[error("タイマーが{status}状態のため設定を変更できません")]
    ConfigureWhileActive {
        /// Status at the time of the call
        status: CountdownStatus,
    },

    /// A command was issued after `dispose`.
    #[error("タイマーは既に破棄されています")]
    Disposed,

    /// No runtime is available to drive heartbeats.
    #[error("ハートビートスケジューラを初期化できません: {0}")]
    SchedulerUnavailable(String),
}

impl CountdownError {
    /// Returns true if the error rejected a configuration change.
    #[must_use]
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::ConfigureWhileActive { .. }
        )
    }

    /// Returns true if the error points at a lifecycle bug in the caller.
    #[must_use]
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(self, Self::Disposed)
    }
}
