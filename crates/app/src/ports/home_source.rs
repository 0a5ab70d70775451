//! Home source port: the external home-automation framework.
//!
//! A home source owns the authoritative object graph. It enumerates homes and
//! services, arms change notifications per characteristic, performs
//! characteristic IO and CRUD operations, and pushes [`SourceEvent`]s back to
//! the core whenever something changes on its side.
//!
//! Every object the source knows about is addressed through the
//! [`SourceHandle`] stored in the object's [`Backing::Live`]. Detached objects
//! never reach the source; the use-case layer handles them locally.
//!
//! [`Backing::Live`]: hkmirror_domain::backing::Backing::Live

use std::future::Future;

use hkmirror_domain::backing::SourceHandle;
use hkmirror_domain::characteristic::{CharacteristicCategory, CharacteristicValue};
use hkmirror_domain::error::MirrorError;
use hkmirror_domain::home::Home;
use hkmirror_domain::id::{HomeId, ServiceId};
use hkmirror_domain::room::Room;
use hkmirror_domain::service::{Service, ServiceCategory};
use hkmirror_domain::zone::Zone;

/// Something the home source reports back to the core.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// The set of homes changed; carries the primary home when there is one.
    HomesUpdated { primary: Option<Home> },
    /// The user picked another primary home.
    PrimaryHomeUpdated { primary: Home },
    HomeAdded { home: Home },
    HomeRemoved { home_id: HomeId },
    /// An armed characteristic reported a new value.
    ValueChanged {
        service: Service,
        characteristic_type: String,
        value: Option<CharacteristicValue>,
    },
}

/// The external home-automation framework, seen from the core.
///
/// Enumeration is synchronous (it reads the source's in-memory graph); every
/// request that may involve the network is a future.
pub trait HomeSource: Send + Sync + 'static {
    /// Every home known to the source.
    fn homes(&self) -> Vec<Home>;

    /// Services of `home` whose category is one of `categories`.
    fn services(&self, home: &Home, categories: &[ServiceCategory]) -> Vec<Service>;

    /// Ask the source to start pushing value changes for one characteristic.
    fn enable_notification(
        &self,
        service: &SourceHandle,
        service_id: ServiceId,
        category: CharacteristicCategory,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    /// Fetch the current value of a characteristic from the accessory.
    fn read_value(
        &self,
        service: &SourceHandle,
        category: CharacteristicCategory,
    ) -> impl Future<Output = Result<Option<CharacteristicValue>, MirrorError>> + Send;

    /// Write a characteristic value to the accessory.
    fn write_value(
        &self,
        service: &SourceHandle,
        category: CharacteristicCategory,
        value: CharacteristicValue,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    /// Rename any live object.
    fn rename(
        &self,
        object: &SourceHandle,
        name: &str,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    fn add_home(&self, name: &str) -> impl Future<Output = Result<Home, MirrorError>> + Send;

    fn remove_home(&self, home: &SourceHandle)
    -> impl Future<Output = Result<(), MirrorError>> + Send;

    fn update_primary_home(
        &self,
        home: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    fn add_room(
        &self,
        home: &SourceHandle,
        name: &str,
    ) -> impl Future<Output = Result<Room, MirrorError>> + Send;

    fn remove_room(
        &self,
        home: &SourceHandle,
        room: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    fn add_zone(
        &self,
        home: &SourceHandle,
        name: &str,
    ) -> impl Future<Output = Result<Zone, MirrorError>> + Send;

    fn remove_zone(
        &self,
        home: &SourceHandle,
        zone: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    fn add_room_to_zone(
        &self,
        zone: &SourceHandle,
        room: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    fn remove_room_from_zone(
        &self,
        zone: &SourceHandle,
        room: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    /// Run every action of a scene.
    fn execute_action_set(
        &self,
        home: &SourceHandle,
        action_set: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    fn enable_trigger(
        &self,
        trigger: &SourceHandle,
        enabled: bool,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;
}
