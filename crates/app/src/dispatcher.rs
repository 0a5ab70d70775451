//! Dispatcher: the single ingress for characteristic value changes.
//!
//! The home source reports a change as (service, characteristic, value). The
//! dispatcher looks up the handlers registered under `(service id, category)`
//! and invokes them one after the other, in registration order, on the
//! caller's thread. A panicking handler is logged and skipped; the handlers
//! after it still run.

use std::panic::{AssertUnwindSafe, catch_unwind};

use hkmirror_domain::characteristic::{CharacteristicCategory, CharacteristicValue};
use hkmirror_domain::service::Service;

use crate::listener_registry::{ListenerKey, ListenerRegistry};

#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: ListenerRegistry,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Deliver `value` to every handler registered for `(service, category)`.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(
        &self,
        service: &Service,
        category: CharacteristicCategory,
        value: Option<&CharacteristicValue>,
    ) -> usize {
        let handlers = self
            .registry
            .lookup(&ListenerKey::new(service.id(), category));
        for handler in &handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(service, value))).is_err() {
                tracing::error!(
                    service = %service.id(),
                    characteristic = %category,
                    "update handler panicked"
                );
            }
        }
        handlers.len()
    }

    /// Like [`dispatch`](Self::dispatch), keyed by the raw wire type.
    ///
    /// Unknown characteristic types are ignored.
    pub fn dispatch_raw(
        &self,
        service: &Service,
        characteristic_type: &str,
        value: Option<&CharacteristicValue>,
    ) -> usize {
        match CharacteristicCategory::from_wire_id(characteristic_type) {
            Some(category) => self.dispatch(service, category, value),
            None => {
                tracing::debug!(
                    service = %service.id(),
                    characteristic_type,
                    "ignoring change of unknown characteristic type"
                );
                0
            }
        }
    }
}
