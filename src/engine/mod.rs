//! Countdown engine module.
//!
//! This module contains the core timer functionality:
//! - `countdown`: the drift-corrected countdown state machine
//! - `clock`: injected time sources
//! - `scheduler`: injected periodic wake-up schedulers
//! - `error`: error types for engine commands

pub mod clock;
pub mod countdown;
pub mod error;
pub mod scheduler;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use countdown::{CountdownEngine, CountdownEvent, TokioCountdown};
pub use error::CountdownError;
pub use scheduler::{
    HeartbeatCallback, ManualScheduler, Scheduler, SubscriptionHandle, TokioScheduler,
};

/// Locks a mutex, recovering the guard if a previous holder panicked.
///
/// Every critical section in this module leaves its state consistent, so a
/// poisoned lock carries no torn data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
