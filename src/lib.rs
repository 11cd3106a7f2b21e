//! Countdown Timer Library
//!
//! This library provides a drift-corrected countdown timer and a small
//! terminal front end for it. It includes:
//! - Countdown engine with an idle/running/finished state machine
//! - Injected clock and wake-up scheduler abstractions (tokio and manual)
//! - CLI command parsing, display utilities and an interactive shell
//! - Type definitions for configuration, status and snapshots

pub mod cli;
pub mod engine;
pub mod types;

// Re-export commonly used types for convenience
pub use engine::{
    Clock, CountdownEngine, CountdownError, CountdownEvent, ManualClock, ManualScheduler,
    MonotonicClock, Scheduler, SubscriptionHandle, TokioCountdown, TokioScheduler,
};
pub use types::{CountdownConfig, CountdownSnapshot, CountdownStatus, TimeRemaining};
