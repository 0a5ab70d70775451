//! Deferred-home queue: callbacks waiting for a home to resolve.
//!
//! Subscriptions made before the home source has reported a home are parked
//! here. [`DeferredHomeQueue::resolve`] drains the queue and runs each
//! callback exactly once, in insertion order. Once a home is known, new
//! callbacks run immediately instead of being queued.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, MutexGuard, PoisonError};

use hkmirror_domain::home::Home;

/// One-shot callback run with the resolved home.
pub type HomeCallback = Box<dyn FnOnce(&Home) + Send>;

#[derive(Default)]
struct State {
    home: Option<Home>,
    pending: Vec<HomeCallback>,
}

#[derive(Default)]
pub struct DeferredHomeQueue {
    state: Mutex<State>,
}

impl DeferredHomeQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `callback` with the current home, or queue it until one resolves.
    ///
    /// Returns `true` when the callback ran immediately.
    pub fn when_available(&self, callback: HomeCallback) -> bool {
        let mut state = self.state();
        let Some(home) = state.home.clone() else {
            state.pending.push(callback);
            return false;
        };
        drop(state);
        run_isolated(callback, &home);
        true
    }

    /// Make `home` the current home and run every queued callback with it.
    ///
    /// Returns the number of callbacks run. Callbacks queued during this call
    /// (by a callback subscribing again) run immediately since the home is
    /// already set.
    pub fn resolve(&self, home: Home) -> usize {
        let pending = {
            let mut state = self.state();
            state.home = Some(home.clone());
            std::mem::take(&mut state.pending)
        };
        let count = pending.len();
        for callback in pending {
            run_isolated(callback, &home);
        }
        count
    }

    /// Snapshot of the current home.
    #[must_use]
    pub fn current(&self) -> Option<Home> {
        self.state().home.clone()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state().home.is_some()
    }

    /// Apply `update` to the current home snapshot, if any.
    pub fn update_current<T>(&self, update: impl FnOnce(&mut Home) -> T) -> Option<T> {
        self.state().home.as_mut().map(update)
    }

    /// Forget the current home; later callbacks queue again.
    pub fn reset(&self) -> Option<Home> {
        self.state().home.take()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state().pending.len()
    }
}

fn run_isolated(callback: HomeCallback, home: &Home) {
    if catch_unwind(AssertUnwindSafe(|| callback(home))).is_err() {
        tracing::error!(home = %home.id(), "deferred home callback panicked");
    }
}

impl fmt::Debug for DeferredHomeQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("DeferredHomeQueue")
            .field("home", &state.home.as_ref().map(Home::id))
            .field("pending", &state.pending.len())
            .finish()
    }
}
