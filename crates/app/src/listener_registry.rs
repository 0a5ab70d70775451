//! Listener registry: update handlers keyed by (service, characteristic category).
//!
//! Handlers registered under the same key are kept in insertion order, which
//! is the order the dispatcher invokes them in. There is no de-duplication: a
//! handler registered twice fires twice.
//!
//! Every handler belongs to a [`SubscriptionId`] minted by [`ListenerRegistry::open`].
//! Closing a subscription removes all of its handlers and refuses any later
//! registration under it, which is what lets a deferred subscription be
//! cancelled before the home it waits for resolves. A deferred subscription
//! parks its handler here rather than in the queued callback, so closing it
//! releases the handler at once.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hkmirror_domain::characteristic::{CharacteristicCategory, CharacteristicValue};
use hkmirror_domain::id::ServiceId;
use hkmirror_domain::service::Service;

/// Callback invoked with the updated service and its new value.
pub type UpdateHandler = Arc<dyn Fn(&Service, Option<&CharacteristicValue>) + Send + Sync>;

/// Token returned by every subscription call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Compound identity handlers are registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey {
    pub service: ServiceId,
    pub category: CharacteristicCategory,
}

impl ListenerKey {
    #[must_use]
    pub fn new(service: ServiceId, category: CharacteristicCategory) -> Self {
        Self { service, category }
    }
}

struct Listener {
    subscription: SubscriptionId,
    handler: UpdateHandler,
}

#[derive(Default)]
struct Table {
    listeners: HashMap<ListenerKey, Vec<Listener>>,
    open: HashSet<SubscriptionId>,
    parked: HashMap<SubscriptionId, UpdateHandler>,
    next_id: u64,
}

/// Thread-safe registration table.
///
/// The lock is only held for table bookkeeping, never while a handler runs,
/// so handlers may register or close subscriptions themselves.
#[derive(Default)]
pub struct ListenerRegistry {
    table: Mutex<Table>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mint a new open subscription.
    pub fn open(&self) -> SubscriptionId {
        let mut table = self.table();
        table.next_id += 1;
        let id = SubscriptionId(table.next_id);
        table.open.insert(id);
        id
    }

    #[must_use]
    pub fn is_open(&self, subscription: SubscriptionId) -> bool {
        self.table().open.contains(&subscription)
    }

    /// Append `handler` to the list at `key`, creating the key if absent.
    ///
    /// Returns `false` (and registers nothing) when the subscription was
    /// closed in the meantime.
    pub fn register(
        &self,
        subscription: SubscriptionId,
        key: ListenerKey,
        handler: UpdateHandler,
    ) -> bool {
        let mut table = self.table();
        if !table.open.contains(&subscription) {
            return false;
        }
        table.listeners.entry(key).or_default().push(Listener {
            subscription,
            handler,
        });
        true
    }

    /// Hold `handler` for `subscription` until it is claimed or closed.
    ///
    /// Returns `false` when the subscription is already closed.
    pub fn park(&self, subscription: SubscriptionId, handler: UpdateHandler) -> bool {
        let mut table = self.table();
        if !table.open.contains(&subscription) {
            return false;
        }
        table.parked.insert(subscription, handler);
        true
    }

    /// Take back the handler parked for `subscription`.
    ///
    /// `None` once the subscription was closed or the handler claimed.
    pub fn claim(&self, subscription: SubscriptionId) -> Option<UpdateHandler> {
        self.table().parked.remove(&subscription)
    }

    /// Snapshot of the handlers at `key`, in registration order.
    #[must_use]
    pub fn lookup(&self, key: &ListenerKey) -> Vec<UpdateHandler> {
        self.table()
            .listeners
            .get(key)
            .map(|listeners| {
                listeners
                    .iter()
                    .map(|l| Arc::clone(&l.handler))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Close a subscription and drop its handlers, parked or registered.
    ///
    /// Returns the number of registered handlers removed, or `None` when the
    /// subscription was already closed. Keys left empty are dropped.
    pub fn close(&self, subscription: SubscriptionId) -> Option<usize> {
        let mut table = self.table();
        if !table.open.remove(&subscription) {
            return None;
        }
        table.parked.remove(&subscription);
        let mut removed = 0;
        table.listeners.retain(|_, listeners| {
            let before = listeners.len();
            listeners.retain(|l| l.subscription != subscription);
            removed += before - listeners.len();
            !listeners.is_empty()
        });
        Some(removed)
    }

    /// Number of keys with at least one handler.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.table().listeners.len()
    }

    #[must_use]
    pub fn contains_key(&self, key: &ListenerKey) -> bool {
        self.table().listeners.contains_key(key)
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table();
        f.debug_struct("ListenerRegistry")
            .field("keys", &table.listeners.len())
            .field("open_subscriptions", &table.open.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkmirror_domain::service::ServiceCategory;

    fn key(category: CharacteristicCategory) -> ListenerKey {
        ListenerKey::new(ServiceId::new(), category)
    }

    fn recording(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> UpdateHandler {
        let log = Arc::clone(log);
        Arc::new(move |_, _| log.lock().unwrap().push(tag))
    }

    fn service() -> Service {
        Service::builder()
            .category(ServiceCategory::Lightbulb)
            .build()
            .unwrap()
    }

    #[test]
    fn should_return_empty_list_when_key_unknown() {
        let registry = ListenerRegistry::new();
        assert!(registry.lookup(&key(CharacteristicCategory::PowerState)).is_empty());
        assert_eq!(registry.key_count(), 0);
    }

    #[test]
    fn should_keep_insertion_order_when_registering_same_key() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let k = key(CharacteristicCategory::PowerState);
        let sub = registry.open();
        registry.register(sub, k, recording(&log, "h1"));
        registry.register(sub, k, recording(&log, "h2"));

        let service = service();
        for handler in registry.lookup(&k) {
            handler(&service, None);
        }
        assert_eq!(*log.lock().unwrap(), vec!["h1", "h2"]);
    }

    #[test]
    fn should_not_dedup_when_same_handler_registered_twice() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recording(&log, "h");
        let k = key(CharacteristicCategory::ContactState);
        let sub = registry.open();
        registry.register(sub, k, Arc::clone(&handler));
        registry.register(sub, k, handler);
        assert_eq!(registry.lookup(&k).len(), 2);
    }

    #[test]
    fn should_keep_keys_separate_when_service_or_category_differs() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = ServiceId::new();
        let power = ListenerKey::new(service, CharacteristicCategory::PowerState);
        let brightness = ListenerKey::new(service, CharacteristicCategory::Brightness);
        let other = ListenerKey::new(ServiceId::new(), CharacteristicCategory::PowerState);
        let sub = registry.open();
        registry.register(sub, power, recording(&log, "power"));

        assert_eq!(registry.lookup(&power).len(), 1);
        assert!(registry.lookup(&brightness).is_empty());
        assert!(registry.lookup(&other).is_empty());
    }

    #[test]
    fn should_remove_only_closed_subscription_handlers() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let k = key(CharacteristicCategory::MotionDetected);
        let first = registry.open();
        let second = registry.open();
        registry.register(first, k, recording(&log, "first"));
        registry.register(second, k, recording(&log, "second"));

        assert_eq!(registry.close(first), Some(1));
        for handler in registry.lookup(&k) {
            handler(&service(), None);
        }
        assert_eq!(*log.lock().unwrap(), vec!["second"]);
    }

    #[test]
    fn should_drop_key_when_last_handler_removed() {
        let registry = ListenerRegistry::new();
        let k = key(CharacteristicCategory::PowerState);
        let sub = registry.open();
        registry.register(sub, k, Arc::new(|_, _| {}));
        assert!(registry.contains_key(&k));
        registry.close(sub);
        assert!(!registry.contains_key(&k));
    }

    #[test]
    fn should_refuse_registration_when_subscription_closed() {
        let registry = ListenerRegistry::new();
        let k = key(CharacteristicCategory::PowerState);
        let sub = registry.open();
        assert_eq!(registry.close(sub), Some(0));
        assert_eq!(registry.close(sub), None);
        assert!(!registry.is_open(sub));
        assert!(!registry.register(sub, k, Arc::new(|_, _| {})));
        assert!(registry.lookup(&k).is_empty());
    }

    #[test]
    fn should_release_parked_handler_when_closed() {
        let registry = ListenerRegistry::new();
        let handler: UpdateHandler = Arc::new(|_, _| {});
        let sub = registry.open();
        assert!(registry.park(sub, Arc::clone(&handler)));
        assert_eq!(Arc::strong_count(&handler), 2);

        registry.close(sub);
        assert_eq!(Arc::strong_count(&handler), 1);
        assert!(registry.claim(sub).is_none());
        assert!(!registry.park(sub, handler));
    }

    #[test]
    fn should_claim_parked_handler_once() {
        let registry = ListenerRegistry::new();
        let sub = registry.open();
        registry.park(sub, Arc::new(|_, _| {}));
        assert!(registry.claim(sub).is_some());
        assert!(registry.claim(sub).is_none());
    }

    #[test]
    fn should_allow_registration_from_inside_handler() {
        let registry = Arc::new(ListenerRegistry::new());
        let k = key(CharacteristicCategory::PowerState);
        let sub = registry.open();
        let inner = Arc::clone(&registry);
        registry.register(
            sub,
            k,
            Arc::new(move |_, _| {
                inner.register(sub, k, Arc::new(|_, _| {}));
            }),
        );
        for handler in registry.lookup(&k) {
            handler(&service(), None);
        }
        assert_eq!(registry.lookup(&k).len(), 2);
    }

    #[test]
    fn should_register_concurrently_from_many_threads() {
        let registry = Arc::new(ListenerRegistry::new());
        let k = key(CharacteristicCategory::PowerState);
        let sub = registry.open();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        registry.register(sub, k, Arc::new(|_, _| {}));
                        let _ = registry.lookup(&k);
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        assert_eq!(registry.lookup(&k).len(), 400);
    }
}
