//! Drift-corrected countdown engine.
//!
//! The engine is a wall-clock-based state machine. Every heartbeat subtracts
//! the time actually elapsed since the previous sample rather than a nominal
//! tick size, so late or irregular wake-ups never accumulate error.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --remaining hits 0--> Finished
//!   ^                |                              |
//!   +-----pause------+                              |
//!   +---------------------reset---------------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let engine = CountdownEngine::with_tokio(CountdownConfig::default())?;
//! let mut events = engine.subscribe();
//! engine.start()?;
//! while let Some(event) = events.recv().await {
//!     if event == CountdownEvent::Finished {
//!         break;
//!     }
//! }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use super::clock::{Clock, MonotonicClock};
use super::error::CountdownError;
use super::lock;
use super::scheduler::{HeartbeatCallback, Scheduler, SubscriptionHandle, TokioScheduler};
use crate::types::{CountdownConfig, CountdownSnapshot, CountdownStatus, TimeRemaining};

// ============================================================================
// CountdownEvent
// ============================================================================

/// Notifications broadcast to subscribers on effective state changes.
///
/// Commands that turn out to be no-ops broadcast nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Countdown started or resumed
    Started {
        /// Remaining milliseconds at start
        remaining_ms: u64,
    },
    /// Countdown paused
    Paused {
        /// Remaining milliseconds at pause
        remaining_ms: u64,
    },
    /// Countdown returned to its full length
    Reset {
        /// Remaining milliseconds after reset
        remaining_ms: u64,
    },
    /// Countdown length changed
    Configured {
        /// New countdown length in milliseconds
        total_duration_ms: u64,
    },
    /// Countdown reached zero. Sent exactly once per completed run.
    Finished,
}

// ============================================================================
// EngineCore
// ============================================================================

struct EngineCore<C: Clock, S: Scheduler> {
    total_duration_ms: u64,
    remaining_ms: u64,
    status: CountdownStatus,
    /// Clock reading of the last start or heartbeat; `Some` iff running.
    last_sample_ms: Option<u64>,
    heartbeat_interval: Duration,
    subscription: Option<SubscriptionHandle>,
    /// Bumped for every subscription so late callbacks of an old one can be
    /// told apart.
    heartbeat_epoch: u64,
    disposed: bool,
    clock: C,
    scheduler: S,
    listeners: Vec<mpsc::UnboundedSender<CountdownEvent>>,
}

impl<C: Clock + 'static, S: Scheduler + 'static> EngineCore<C, S> {
    fn ensure_usable(&self) -> Result<(), CountdownError> {
        if self.disposed {
            warn!("Command issued to a disposed countdown engine");
            return Err(CountdownError::Disposed);
        }
        Ok(())
    }

    fn configure(&mut self, duration_ms: u64) -> Result<(), CountdownError> {
        if self.status != CountdownStatus::Idle {
            return Err(CountdownError::ConfigureWhileActive {
                status: self.status,
            });
        }

        self.total_duration_ms = duration_ms;
        self.remaining_ms = duration_ms;
        debug!(duration_ms, "Countdown configured");
        self.emit(CountdownEvent::Configured {
            total_duration_ms: duration_ms,
        });
        Ok(())
    }

    fn start(&mut self, engine: Weak<Mutex<Self>>) {
        if self.status != CountdownStatus::Idle {
            debug!(status = %self.status, "Start ignored");
            return;
        }

        if self.remaining_ms == 0 {
            self.finish();
            return;
        }

        self.last_sample_ms = Some(self.clock.now_ms());
        self.status = CountdownStatus::Running;
        self.acquire_heartbeat(engine);

        debug!(remaining_ms = self.remaining_ms, "Countdown started");
        self.emit(CountdownEvent::Started {
            remaining_ms: self.remaining_ms,
        });
    }

    fn pause(&mut self) {
        if !self.status.is_running() {
            debug!(status = %self.status, "Pause ignored");
            return;
        }

        // Account for the time since the last heartbeat before freezing.
        // Reaching zero here still pauses; the next start finishes at once.
        self.advance();
        self.release_heartbeat();
        self.last_sample_ms = None;
        self.status = CountdownStatus::Idle;

        debug!(remaining_ms = self.remaining_ms, "Countdown paused");
        self.emit(CountdownEvent::Paused {
            remaining_ms: self.remaining_ms,
        });
    }

    fn reset(&mut self) {
        self.release_heartbeat();
        self.remaining_ms = self.total_duration_ms;
        self.last_sample_ms = None;
        self.status = CountdownStatus::Idle;

        debug!(remaining_ms = self.remaining_ms, "Countdown reset");
        self.emit(CountdownEvent::Reset {
            remaining_ms: self.remaining_ms,
        });
    }

    fn dispose(&mut self) {
        self.release_heartbeat();
        if !self.disposed {
            self.disposed = true;
            // Dropping the senders closes every subscriber's channel.
            self.listeners.clear();
            debug!("Countdown disposed");
        }
    }

    /// Handles one wake-up. `epoch` is `None` for host-driven heartbeats.
    fn on_heartbeat(&mut self, epoch: Option<u64>) {
        if self.disposed || !self.status.is_running() {
            trace!(status = %self.status, "Heartbeat ignored");
            return;
        }
        if let Some(epoch) = epoch {
            if self.subscription.is_none() || epoch != self.heartbeat_epoch {
                trace!(epoch, current = self.heartbeat_epoch, "Stale heartbeat ignored");
                return;
            }
        }

        self.advance();
        if self.remaining_ms == 0 {
            self.finish();
        }
    }

    /// Subtracts the clock time elapsed since the last sample.
    ///
    /// A reading earlier than the last sample counts as zero elapsed time.
    /// This keeps the countdown from running backwards on a misbehaving
    /// clock; it does not make such a clock accurate.
    fn advance(&mut self) {
        let Some(last) = self.last_sample_ms else {
            return;
        };

        let now = self.clock.now_ms();
        let elapsed = now.checked_sub(last).unwrap_or_else(|| {
            warn!(now, last, "Clock moved backwards; counting no elapsed time");
            0
        });

        self.last_sample_ms = Some(now);
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
    }

    fn finish(&mut self) {
        self.release_heartbeat();
        self.remaining_ms = 0;
        self.last_sample_ms = None;
        self.status = CountdownStatus::Finished;

        info!(total_duration_ms = self.total_duration_ms, "Countdown finished");
        self.emit(CountdownEvent::Finished);
    }

    fn acquire_heartbeat(&mut self, engine: Weak<Mutex<Self>>) {
        if self.subscription.is_some() {
            return;
        }

        self.heartbeat_epoch += 1;
        let epoch = self.heartbeat_epoch;
        let callback: HeartbeatCallback = Arc::new(move || {
            if let Some(shared) = engine.upgrade() {
                lock(&shared).on_heartbeat(Some(epoch));
            }
        });

        self.subscription = Some(self.scheduler.subscribe(self.heartbeat_interval, callback));
    }

    fn emit(&mut self, event: CountdownEvent) {
        self.listeners.retain(|tx| tx.send(event).is_ok());
    }

    fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            status: self.status,
            remaining_ms: self.remaining_ms,
            total_duration_ms: self.total_duration_ms,
        }
    }
}

impl<C: Clock, S: Scheduler> EngineCore<C, S> {
    fn release_heartbeat(&mut self) {
        if let Some(handle) = self.subscription.take() {
            self.scheduler.unsubscribe(handle);
        }
    }
}

impl<C: Clock, S: Scheduler> Drop for EngineCore<C, S> {
    fn drop(&mut self) {
        self.release_heartbeat();
    }
}

// ============================================================================
// CountdownEngine
// ============================================================================

/// Countdown timer driven by an injected clock and wake-up scheduler.
///
/// Cloning yields another handle to the same countdown. Every command and
/// every heartbeat runs as one critical section, so the engine may be shared
/// across threads.
pub struct CountdownEngine<C: Clock, S: Scheduler> {
    shared: Arc<Mutex<EngineCore<C, S>>>,
}

/// Engine wired to a monotonic clock and the current tokio runtime.
pub type TokioCountdown = CountdownEngine<MonotonicClock, TokioScheduler>;

impl<C: Clock + 'static, S: Scheduler + 'static> CountdownEngine<C, S> {
    /// Creates an idle engine holding the full configured duration.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::InvalidConfiguration` if the configuration
    /// does not validate.
    pub fn new(config: CountdownConfig, clock: C, scheduler: S) -> Result<Self, CountdownError> {
        config.validate()?;

        let core = EngineCore {
            total_duration_ms: config.duration_ms,
            remaining_ms: config.duration_ms,
            status: CountdownStatus::Idle,
            last_sample_ms: None,
            heartbeat_interval: Duration::from_millis(config.heartbeat_interval_ms),
            subscription: None,
            heartbeat_epoch: 0,
            disposed: false,
            clock,
            scheduler,
            listeners: Vec::new(),
        };

        Ok(Self {
            shared: Arc::new(Mutex::new(core)),
        })
    }

    fn core(&self) -> MutexGuard<'_, EngineCore<C, S>> {
        lock(&self.shared)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Changes the countdown length. Only allowed while idle.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::ConfigureWhileActive` if the countdown is
    /// running or finished, and `CountdownError::Disposed` after `dispose`.
    pub fn configure(&self, duration_ms: u64) -> Result<(), CountdownError> {
        let mut core = self.core();
        core.ensure_usable()?;
        core.configure(duration_ms)
    }

    /// Starts or resumes the countdown. A no-op unless idle.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::Disposed` after `dispose`.
    pub fn start(&self) -> Result<(), CountdownError> {
        let engine = Arc::downgrade(&self.shared);
        let mut core = self.core();
        core.ensure_usable()?;
        core.start(engine);
        Ok(())
    }

    /// Pauses a running countdown. A no-op unless running.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::Disposed` after `dispose`.
    pub fn pause(&self) -> Result<(), CountdownError> {
        let mut core = self.core();
        core.ensure_usable()?;
        core.pause();
        Ok(())
    }

    /// Returns to idle with the full configured duration, from any state.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::Disposed` after `dispose`.
    pub fn reset(&self) -> Result<(), CountdownError> {
        let mut core = self.core();
        core.ensure_usable()?;
        core.reset();
        Ok(())
    }

    /// Delivers a heartbeat from the host instead of the scheduler.
    ///
    /// Ignored unless running.
    pub fn heartbeat(&self) {
        self.core().on_heartbeat(None);
    }

    /// Releases the wake-up subscription and closes all event channels.
    ///
    /// Every later command fails with `CountdownError::Disposed`. Calling
    /// this more than once is harmless.
    pub fn dispose(&self) {
        self.core().dispose();
    }

    /// Subscribes to lifecycle events.
    ///
    /// The channel closes when the engine is disposed or dropped.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<CountdownEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut core = self.core();
        if !core.disposed {
            core.listeners.push(tx);
        }
        rx
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> CountdownStatus {
        self.core().status
    }

    pub fn remaining_ms(&self) -> u64 {
        self.core().remaining_ms
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.core().total_duration_ms
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.core().heartbeat_interval
    }

    pub fn is_disposed(&self) -> bool {
        self.core().disposed
    }

    /// Minutes/seconds projection of the remaining time.
    pub fn time_remaining(&self) -> TimeRemaining {
        TimeRemaining::from_ms(self.remaining_ms())
    }

    /// Consistent view of status and durations taken under one lock.
    pub fn snapshot(&self) -> CountdownSnapshot {
        self.core().snapshot()
    }
}

impl TokioCountdown {
    /// Creates an engine ticking on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::SchedulerUnavailable` outside a runtime, or
    /// `CountdownError::InvalidConfiguration` for a bad configuration.
    pub fn with_tokio(config: CountdownConfig) -> Result<Self, CountdownError> {
        Self::new(config, MonotonicClock::new(), TokioScheduler::try_current()?)
    }
}

impl<C: Clock, S: Scheduler> Clone for CountdownEngine<C, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Clock, S: Scheduler> fmt::Debug for CountdownEngine<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = lock(&self.shared);
        f.debug_struct("CountdownEngine")
            .field("status", &core.status)
            .field("remaining_ms", &core.remaining_ms)
            .field("total_duration_ms", &core.total_duration_ms)
            .field("disposed", &core.disposed)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
