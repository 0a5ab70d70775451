//! Manager: the subscription facade and home lifecycle.
//!
//! The manager wires the notification core together:
//!
//! - subscription calls made before any home is known are parked in the
//!   [`DeferredHomeQueue`] and installed once the source reports one;
//! - installing a subscription registers the handler in the
//!   [`ListenerRegistry`](crate::listener_registry::ListenerRegistry) first and
//!   only then arms the characteristic through the [`NotificationEnabler`];
//! - [`SourceEvent`]s coming back from the source are routed through
//!   [`Manager::handle_event`], value changes ending up in the [`Dispatcher`].
//!
//! Subscription calls never fail. A characteristic that is missing, cannot
//! notify, or fails to arm simply never delivers anything.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use hkmirror_domain::backing::Mirrored;
use hkmirror_domain::characteristic::{CharacteristicCategory, CharacteristicValue};
use hkmirror_domain::error::{MirrorError, ValidationError};
use hkmirror_domain::home::Home;
use hkmirror_domain::id::HomeId;
use hkmirror_domain::service::{Service, ServiceCategory};

use crate::deferred_home::DeferredHomeQueue;
use crate::dispatcher::Dispatcher;
use crate::listener_registry::{ListenerKey, SubscriptionId, UpdateHandler};
use crate::notification_enabler::NotificationEnabler;
use crate::ports::{HomeSource, SourceEvent};

struct Shared<S> {
    source: Arc<S>,
    dispatcher: Dispatcher,
    homes: DeferredHomeQueue,
    enabler: NotificationEnabler<S>,
    primary: Mutex<Option<Home>>,
}

impl<S: HomeSource> Shared<S> {
    fn primary(&self) -> MutexGuard<'_, Option<Home>> {
        self.primary.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register then arm one (service, category) pair.
    ///
    /// Returns `true` when a handler was registered.
    fn install(
        &self,
        subscription: SubscriptionId,
        service: &Service,
        category: CharacteristicCategory,
        handler: &UpdateHandler,
    ) -> bool {
        let Some(characteristic) = service.characteristic(category) else {
            return false;
        };
        if !characteristic.supports_event_notification() {
            tracing::debug!(
                service = %service.id(),
                characteristic = %category,
                "characteristic does not support notifications, skipping"
            );
            return false;
        }
        let key = ListenerKey::new(service.id(), category);
        if !self
            .dispatcher
            .registry()
            .register(subscription, key, Arc::clone(handler))
        {
            return false;
        }
        self.enabler.arm(service, category);
        true
    }
}

/// Upgrade `weak` and take the handler parked for `subscription`.
///
/// `None` when the manager is gone or the subscription was cancelled.
fn claim<S: HomeSource>(
    weak: &Weak<Shared<S>>,
    subscription: SubscriptionId,
) -> Option<(Arc<Shared<S>>, UpdateHandler)> {
    let shared = weak.upgrade()?;
    let handler = shared.dispatcher.registry().claim(subscription)?;
    Some((shared, handler))
}

/// Cheaply clonable handle on the notification core.
pub struct Manager<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for Manager<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: HomeSource> Manager<S> {
    /// Arm requests are spawned on `runtime`.
    pub fn new(source: Arc<S>, runtime: Handle) -> Self {
        let enabler = NotificationEnabler::new(Arc::clone(&source), runtime);
        Self {
            shared: Arc::new(Shared {
                source,
                dispatcher: Dispatcher::new(),
                homes: DeferredHomeQueue::new(),
                enabler,
                primary: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn source(&self) -> &Arc<S> {
        &self.shared.source
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.shared.dispatcher
    }

    #[must_use]
    pub fn enabler(&self) -> &NotificationEnabler<S> {
        &self.shared.enabler
    }

    fn weak(&self) -> Weak<Shared<S>> {
        Arc::downgrade(&self.shared)
    }

    /// Mint a subscription and park its handler until installation.
    fn open(&self, handler: UpdateHandler) -> SubscriptionId {
        let registry = self.shared.dispatcher.registry();
        let subscription = registry.open();
        registry.park(subscription, handler);
        subscription
    }

    // -- subscription facade --------------------------------------------

    /// Subscribe to `category` on every service whose category is in `scope`.
    ///
    /// Pass [`ServiceCategory::ALL`] to watch every service of the home.
    pub fn on_update<F>(
        &self,
        category: CharacteristicCategory,
        scope: &[ServiceCategory],
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(&Service, Option<&CharacteristicValue>) + Send + Sync + 'static,
    {
        self.on_update_any(&[category], scope, handler)
    }

    /// Subscribe to several categories at once with a single handler.
    #[tracing::instrument(skip_all, fields(categories = categories.len(), scope = scope.len()))]
    pub fn on_update_any<F>(
        &self,
        categories: &[CharacteristicCategory],
        scope: &[ServiceCategory],
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(&Service, Option<&CharacteristicValue>) + Send + Sync + 'static,
    {
        let subscription = self.open(Arc::new(handler));
        let categories = categories.to_vec();
        let scope = scope.to_vec();
        let weak = self.weak();
        let immediate = self.shared.homes.when_available(Box::new(move |home| {
            let Some((shared, handler)) = claim(&weak, subscription) else {
                return;
            };
            let mut installed = 0_usize;
            for service in shared.source.services(home, &scope) {
                for category in &categories {
                    if shared.install(subscription, &service, *category, &handler) {
                        installed += 1;
                    }
                }
            }
            tracing::debug!(%subscription, installed, "subscription installed");
        }));
        if !immediate {
            tracing::debug!(%subscription, "no home yet, subscription deferred");
        }
        subscription
    }

    /// Subscribe to `category` on one service, skipping enumeration.
    pub fn on_service_update<F>(
        &self,
        category: CharacteristicCategory,
        service: &Service,
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(&Service, Option<&CharacteristicValue>) + Send + Sync + 'static,
    {
        let subscription = self.open(Arc::new(handler));
        let service = service.clone();
        let weak = self.weak();
        self.shared.homes.when_available(Box::new(move |_| {
            if let Some((shared, handler)) = claim(&weak, subscription) {
                shared.install(subscription, &service, category, &handler);
            }
        }));
        subscription
    }

    /// Service-level form: the handler only receives the new value.
    pub fn on_value<F>(
        &self,
        category: CharacteristicCategory,
        service: &Service,
        handler: F,
    ) -> SubscriptionId
    where
        F: Fn(Option<&CharacteristicValue>) + Send + Sync + 'static,
    {
        self.on_service_update(category, service, move |_, value| handler(value))
    }

    /// Run `callback` with the current home, or once a home resolves.
    ///
    /// Returns `true` when it ran immediately.
    pub fn on_homes_updated<F>(&self, callback: F) -> bool
    where
        F: FnOnce(&Home) + Send + 'static,
    {
        self.shared.homes.when_available(Box::new(callback))
    }

    /// Cancel a subscription, deferred or installed.
    ///
    /// Returns `false` if it was already cancelled. Armed characteristics
    /// stay armed.
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let Some(removed) = self.shared.dispatcher.registry().close(subscription) else {
            return false;
        };
        tracing::debug!(%subscription, removed, "unsubscribed");
        true
    }

    /// Resolve once every arm request sent so far has completed.
    pub async fn wait_idle(&self) {
        self.shared.enabler.wait_idle().await;
    }

    // -- home lifecycle ----------------------------------------------------

    /// The source reported a new set of homes.
    ///
    /// The primary home is remembered and selected when no home is selected
    /// yet; then every deferred subscription is installed against the
    /// selected home.
    #[tracing::instrument(skip_all, fields(primary = ?primary.as_ref().map(Home::id)))]
    pub fn homes_updated(&self, primary: Option<Home>) {
        let Some(primary) = primary else {
            tracing::debug!("homes updated without a primary home");
            return;
        };
        *self.shared.primary() = Some(primary.clone());
        let current = self
            .shared
            .homes
            .current()
            .and_then(|selected| {
                self.shared
                    .source
                    .homes()
                    .into_iter()
                    .find(|home| home.id() == selected.id())
            })
            .unwrap_or(primary);
        let home_id = current.id();
        let drained = self.shared.homes.resolve(current);
        tracing::info!(home = %home_id, drained, "home resolved");
    }

    /// Only the primary home changed; the selected home stays.
    pub fn primary_home_updated(&self, primary: Home) {
        tracing::info!(home = %primary.id(), "primary home updated");
        *self.shared.primary() = Some(primary);
    }

    /// Make `home` the current home, flushing deferred subscriptions to it.
    pub fn select_home(&self, home: Home) {
        let home_id = home.id();
        let drained = self.shared.homes.resolve(home);
        tracing::info!(home = %home_id, drained, "home selected");
    }

    /// The currently selected home.
    #[must_use]
    pub fn home(&self) -> Option<Home> {
        self.shared.homes.current()
    }

    #[must_use]
    pub fn primary_home(&self) -> Option<Home> {
        self.shared.primary().clone()
    }

    /// Every home known to the source.
    #[must_use]
    pub fn homes(&self) -> Vec<Home> {
        self.shared.source.homes()
    }

    /// Create a home through the source.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] for an empty name, or the
    /// source's error.
    #[tracing::instrument(skip(self))]
    pub async fn add_home(&self, name: &str) -> Result<Home, MirrorError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.shared.source.add_home(name).await
    }

    /// Remove a home through the source.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Detached`] for a detached home, or the
    /// source's error.
    #[tracing::instrument(skip_all, fields(home = %home.id()))]
    pub async fn remove_home(&self, home: &Home) -> Result<(), MirrorError> {
        let handle = home.live_handle()?;
        self.shared.source.remove_home(handle).await
    }

    /// Make `home` the primary home of the source.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Detached`] for a detached home, or the
    /// source's error.
    #[tracing::instrument(skip_all, fields(home = %home.id()))]
    pub async fn update_primary_home(&self, home: &Home) -> Result<(), MirrorError> {
        let handle = home.live_handle()?;
        self.shared.source.update_primary_home(handle).await
    }

    // -- event ingress ---------------------------------------------------

    /// Route one event pushed by the source.
    pub fn handle_event(&self, event: SourceEvent) {
        match event {
            SourceEvent::HomesUpdated { primary } => self.homes_updated(primary),
            SourceEvent::PrimaryHomeUpdated { primary } => self.primary_home_updated(primary),
            SourceEvent::HomeAdded { home } => {
                tracing::info!(home = %home.id(), name = home.name(), "home added");
            }
            SourceEvent::HomeRemoved { home_id } => self.home_removed(home_id),
            SourceEvent::ValueChanged {
                mut service,
                characteristic_type,
                value,
            } => {
                if let Some(category) = CharacteristicCategory::from_wire_id(&characteristic_type)
                {
                    service.set_value(category, value.clone());
                    let service_id = service.id();
                    self.shared.homes.update_current(|home| {
                        if let Some(cached) = home.service_mut(service_id) {
                            cached.set_value(category, value.clone());
                        }
                    });
                }
                self.shared
                    .dispatcher
                    .dispatch_raw(&service, &characteristic_type, value.as_ref());
            }
        }
    }

    fn home_removed(&self, home_id: HomeId) {
        tracing::info!(home = %home_id, "home removed");
        let mut primary = self.shared.primary();
        if primary.as_ref().is_some_and(|home| home.id() == home_id) {
            *primary = None;
        }
        drop(primary);
        if self.home().is_some_and(|home| home.id() == home_id) {
            self.shared.homes.reset();
        }
    }

    /// Pump events from the source until the channel closes.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<SourceEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        tracing::info!("home source event channel closed");
    }
}

impl<S> fmt::Debug for Manager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("registry", self.shared.dispatcher.registry())
            .field("homes", &self.shared.homes)
            .finish_non_exhaustive()
    }
}
