//! Notification enabler: best-effort, idempotent arming of characteristics.
//!
//! Arming asks the home source to start pushing value changes for one
//! characteristic of one service. The request is fire-and-forget: it is
//! spawned on the runtime and [`NotificationEnabler::arm`] returns at once.
//! A failed request is logged and forgotten; the subscriber only ever
//! observes silence for that key.
//!
//! Armed keys are tracked locally, so the source sees at most one request
//! per key no matter how many subscriptions target it.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;

use hkmirror_domain::characteristic::CharacteristicCategory;
use hkmirror_domain::service::Service;

use crate::listener_registry::ListenerKey;
use crate::ports::HomeSource;

type ArmedSet = Arc<Mutex<HashSet<ListenerKey>>>;

/// What [`NotificationEnabler::arm`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// A request was sent to the source.
    Requested,
    /// The key was already armed (or being armed); nothing was sent.
    AlreadyArmed,
    /// No such characteristic, or it cannot notify.
    Unsupported,
    /// The service is detached; there is nothing to arm.
    Detached,
}

pub struct NotificationEnabler<S> {
    source: Arc<S>,
    runtime: Handle,
    armed: ArmedSet,
    in_flight: Arc<watch::Sender<usize>>,
}

fn lock(armed: &ArmedSet) -> MutexGuard<'_, HashSet<ListenerKey>> {
    armed.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: HomeSource> NotificationEnabler<S> {
    /// Requests are spawned on `runtime`.
    pub fn new(source: Arc<S>, runtime: Handle) -> Self {
        let (in_flight, _) = watch::channel(0);
        Self {
            source,
            runtime,
            armed: Arc::default(),
            in_flight: Arc::new(in_flight),
        }
    }

    /// Request notifications for `category` on `service`.
    ///
    /// Never fails; see [`ArmOutcome`] for what happened.
    pub fn arm(&self, service: &Service, category: CharacteristicCategory) -> ArmOutcome {
        let Some(characteristic) = service.characteristic(category) else {
            return ArmOutcome::Unsupported;
        };
        if !characteristic.supports_event_notification() {
            return ArmOutcome::Unsupported;
        }
        let Some(handle) = service.backing().handle().cloned() else {
            return ArmOutcome::Detached;
        };

        let key = ListenerKey::new(service.id(), category);
        if !lock(&self.armed).insert(key) {
            return ArmOutcome::AlreadyArmed;
        }

        let mut request = ArmRequest::start(key, &self.armed, &self.in_flight);
        let source = Arc::clone(&self.source);
        let service_name = service.name().to_string();
        self.runtime.spawn(async move {
            let _ = &request;
            match source
                .enable_notification(&handle, key.service, category)
                .await
            {
                Ok(()) => {
                    tracing::debug!(
                        service = %key.service,
                        characteristic = %category,
                        "notifications enabled"
                    );
                    request.enabled = true;
                }
                Err(error) => {
                    tracing::warn!(
                        service = %key.service,
                        service_name = %service_name,
                        characteristic = %category,
                        error = %error,
                        "failed to enable notifications"
                    );
                }
            }
            request.answered = true;
        });
        ArmOutcome::Requested
    }

    /// Whether `key` is armed or has a request in flight.
    #[must_use]
    pub fn is_armed(&self, key: &ListenerKey) -> bool {
        lock(&self.armed).contains(key)
    }

    /// Number of arm requests not yet answered by the source.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Resolve once every arm request sent so far has completed.
    pub async fn wait_idle(&self) {
        let mut receiver = self.in_flight.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = receiver.wait_for(|count| *count == 0).await;
    }
}

/// One arm request between spawn and answer.
///
/// Dropping it settles the request whatever happened to the task: the
/// in-flight count goes down and, unless the source enabled notifications,
/// the key is un-marked so a later subscription retries.
struct ArmRequest {
    key: ListenerKey,
    armed: ArmedSet,
    in_flight: Arc<watch::Sender<usize>>,
    enabled: bool,
    answered: bool,
}

impl ArmRequest {
    fn start(key: ListenerKey, armed: &ArmedSet, in_flight: &Arc<watch::Sender<usize>>) -> Self {
        in_flight.send_modify(|count| *count += 1);
        Self {
            key,
            armed: Arc::clone(armed),
            in_flight: Arc::clone(in_flight),
            enabled: false,
            answered: false,
        }
    }
}

impl Drop for ArmRequest {
    fn drop(&mut self) {
        if !self.answered {
            tracing::warn!(
                service = %self.key.service,
                characteristic = %self.key.category,
                "arm request aborted before the source answered"
            );
        }
        if !self.enabled {
            lock(&self.armed).remove(&self.key);
        }
        self.in_flight.send_modify(|count| *count = count.saturating_sub(1));
    }
}

impl<S> fmt::Debug for NotificationEnabler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationEnabler")
            .field("armed", &lock(&self.armed).len())
            .field("in_flight", &*self.in_flight.borrow())
            .finish_non_exhaustive()
    }
}
