//! Periodic wake-up schedulers.
//!
//! A [`Scheduler`] invokes a callback roughly every interval until the
//! subscription is released. The engine holds at most one subscription at a
//! time and releases it synchronously inside the command that stops it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::error::CountdownError;
use super::lock;

/// Callback invoked on every wake-up.
pub type HeartbeatCallback = Arc<dyn Fn() + Send + Sync>;

/// Identifies one active subscription on a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Wraps a scheduler-assigned identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the scheduler-assigned identifier.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Periodic wake-up capability.
pub trait Scheduler: Send {
    /// Starts invoking `callback` about every `interval`.
    fn subscribe(&mut self, interval: Duration, callback: HeartbeatCallback) -> SubscriptionHandle;

    /// Stops the subscription. Unknown or already released handles are
    /// ignored.
    fn unsubscribe(&mut self, handle: SubscriptionHandle);
}

// ============================================================================
// TokioScheduler
// ============================================================================

/// Scheduler that drives each subscription from a `tokio::time::interval`
/// task.
///
/// Missed ticks are skipped rather than bursted; the engine measures elapsed
/// time itself, so a late wake-up loses nothing.
#[derive(Debug)]
pub struct TokioScheduler {
    runtime: Handle,
    next_id: u64,
    tasks: HashMap<SubscriptionHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Creates a scheduler spawning onto the given runtime.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    /// Creates a scheduler for the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns `CountdownError::SchedulerUnavailable` outside a tokio runtime.
    pub fn try_current() -> Result<Self, CountdownError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| CountdownError::SchedulerUnavailable(e.to_string()))
    }

    /// Number of subscriptions that have not been released.
    pub fn active_subscriptions(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn subscribe(&mut self, interval: Duration, callback: HeartbeatCallback) -> SubscriptionHandle {
        self.next_id += 1;
        let handle = SubscriptionHandle::new(self.next_id);

        // tokio panics on a zero period
        let period = interval.max(Duration::from_millis(1));
        let task = self.runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                callback();
            }
        });

        debug!(id = handle.id(), ?period, "Heartbeat subscribed");
        self.tasks.insert(handle, task);
        handle
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            debug!(id = handle.id(), "Heartbeat unsubscribed");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

// ============================================================================
// ManualScheduler
// ============================================================================

struct Subscription {
    interval: Duration,
    callback: HeartbeatCallback,
}

#[derive(Default)]
struct ManualSchedulerState {
    next_id: u64,
    active: BTreeMap<SubscriptionHandle, Subscription>,
    total_subscribed: usize,
}

/// Scheduler whose wake-ups are delivered by hand.
///
/// Clones share state: a test keeps one clone and calls [`fire`](Self::fire)
/// while the engine owns the other.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualSchedulerState>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers one wake-up to every active subscription.
    ///
    /// Returns the number of callbacks invoked.
    pub fn fire(&self) -> usize {
        // Callbacks may unsubscribe, so they run without the state lock held.
        let callbacks: Vec<HeartbeatCallback> = lock(&self.state)
            .active
            .values()
            .map(|sub| Arc::clone(&sub.callback))
            .collect();

        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    /// Number of subscriptions that have not been released.
    pub fn active_subscriptions(&self) -> usize {
        lock(&self.state).active.len()
    }

    /// Number of subscriptions ever created.
    pub fn total_subscriptions(&self) -> usize {
        lock(&self.state).total_subscribed
    }

    /// Intervals requested by the active subscriptions.
    pub fn intervals(&self) -> Vec<Duration> {
        lock(&self.state)
            .active
            .values()
            .map(|sub| sub.interval)
            .collect()
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("ManualScheduler")
            .field("active", &state.active.len())
            .field("total_subscribed", &state.total_subscribed)
            .finish()
    }
}

impl Scheduler for ManualScheduler {
    fn subscribe(&mut self, interval: Duration, callback: HeartbeatCallback) -> SubscriptionHandle {
        let mut state = lock(&self.state);
        state.next_id += 1;
        state.total_subscribed += 1;
        let handle = SubscriptionHandle::new(state.next_id);
        state
            .active
            .insert(handle, Subscription { interval, callback });
        handle
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        lock(&self.state).active.remove(&handle);
    }
}

// ============================================================================
// Tests
// ============================================================================
