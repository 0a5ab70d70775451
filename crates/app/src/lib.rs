//! # hkmirror-app
//!
//! Application layer: the notification core and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **`HomeSource` port** the external home-automation framework
//!   is adapted to: enumeration, arming, characteristic IO and CRUD
//!   passthroughs, plus the [`SourceEvent`](ports::SourceEvent)s it pushes back
//! - Provide the **notification core**:
//!   - [`ListenerRegistry`](listener_registry::ListenerRegistry): handlers keyed by (service, characteristic category)
//!   - [`DeferredHomeQueue`](deferred_home::DeferredHomeQueue): callbacks waiting for a home to resolve
//!   - [`NotificationEnabler`](notification_enabler::NotificationEnabler): idempotent, best-effort arming
//!   - [`Dispatcher`](dispatcher::Dispatcher): fans value changes out to registered handlers
//!   - [`Manager`](manager::Manager): the subscription facade and home lifecycle
//! - Provide thin **use-case services** (rename, room/zone/scene passthroughs,
//!   characteristic read/write)
//!
//! ## Dependency rule
//! Depends on `hkmirror-domain` only (plus `tokio` for spawning and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod deferred_home;
pub mod dispatcher;
pub mod listener_registry;
pub mod manager;
pub mod notification_enabler;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
