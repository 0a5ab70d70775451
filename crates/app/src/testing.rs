//! In-test home source shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use hkmirror_domain::accessory::Accessory;
use hkmirror_domain::backing::{Backing, SourceHandle};
use hkmirror_domain::characteristic::{
    CharacteristicCategory, CharacteristicProperties, CharacteristicValue,
};
use hkmirror_domain::error::MirrorError;
use hkmirror_domain::home::Home;
use hkmirror_domain::id::ServiceId;
use hkmirror_domain::room::Room;
use hkmirror_domain::service::{Service, ServiceCategory};
use hkmirror_domain::zone::Zone;

use crate::ports::HomeSource;

/// A lightbulb service with a notifying power state, backed by `handle`.
pub(crate) fn live_lightbulb(handle: &str) -> Service {
    Service::builder()
        .backing(Backing::Live(SourceHandle::new(handle)))
        .category(ServiceCategory::Lightbulb)
        .with_value(
            CharacteristicCategory::PowerState,
            CharacteristicProperties::CONTROL,
            false,
        )
        .build()
        .unwrap()
}

/// A live home holding one accessory per given service.
pub(crate) fn live_home(name: &str, services: Vec<Service>) -> Home {
    let mut builder = Home::builder()
        .name(name)
        .backing(Backing::Live(SourceHandle::new(format!("home:{name}"))));
    for service in services {
        builder = builder.accessory(Accessory::builder().service(service).build().unwrap());
    }
    builder.build().unwrap()
}

fn refused(operation: &str) -> MirrorError {
    MirrorError::from_source(std::io::Error::other(format!("{operation} refused")))
}

#[derive(Default)]
pub(crate) struct FakeSource {
    homes: Mutex<Vec<Home>>,
    enable_calls: Mutex<Vec<(ServiceId, CharacteristicCategory)>>,
    failing: Mutex<HashSet<CharacteristicCategory>>,
    values: Mutex<HashMap<(SourceHandle, CharacteristicCategory), CharacteristicValue>>,
    calls: Mutex<Vec<String>>,
    fail_mutations: Mutex<bool>,
    panic_next_enable: Mutex<bool>,
}

impl FakeSource {
    pub(crate) fn with_homes(homes: Vec<Home>) -> Self {
        let source = Self::default();
        *source.homes.lock().unwrap() = homes;
        source
    }

    pub(crate) fn enable_calls(&self) -> Vec<(ServiceId, CharacteristicCategory)> {
        self.enable_calls.lock().unwrap().clone()
    }

    pub(crate) fn fail_notifications_for(&self, category: CharacteristicCategory) {
        self.failing.lock().unwrap().insert(category);
    }

    /// The next arm request panics instead of answering.
    pub(crate) fn panic_next_enable(&self) {
        *self.panic_next_enable.lock().unwrap() = true;
    }

    pub(crate) fn fail_mutations(&self) {
        *self.fail_mutations.lock().unwrap() = true;
    }

    pub(crate) fn store_value(
        &self,
        handle: &SourceHandle,
        category: CharacteristicCategory,
        value: CharacteristicValue,
    ) {
        self.values
            .lock()
            .unwrap()
            .insert((handle.clone(), category), value);
    }

    pub(crate) fn value(
        &self,
        handle: &SourceHandle,
        category: CharacteristicCategory,
    ) -> Option<CharacteristicValue> {
        self.values
            .lock()
            .unwrap()
            .get(&(handle.clone(), category))
            .cloned()
    }

    /// Operations received so far, e.g. `"rename room:1 Den"`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), MirrorError> {
        self.calls.lock().unwrap().push(call.clone());
        if *self.fail_mutations.lock().unwrap() {
            return Err(refused(&call));
        }
        Ok(())
    }

    fn homes_guard(&self) -> MutexGuard<'_, Vec<Home>> {
        self.homes.lock().unwrap()
    }
}

impl HomeSource for FakeSource {
    fn homes(&self) -> Vec<Home> {
        self.homes_guard().clone()
    }

    fn services(&self, home: &Home, categories: &[ServiceCategory]) -> Vec<Service> {
        home.services_of(categories, None)
            .into_iter()
            .cloned()
            .collect()
    }

    fn enable_notification(
        &self,
        _service: &SourceHandle,
        service_id: ServiceId,
        category: CharacteristicCategory,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        self.enable_calls
            .lock()
            .unwrap()
            .push((service_id, category));
        let result = if self.failing.lock().unwrap().contains(&category) {
            Err(refused("enable notification"))
        } else {
            Ok(())
        };
        let panics = std::mem::take(&mut *self.panic_next_enable.lock().unwrap());
        async move {
            tokio::task::yield_now().await;
            assert!(!panics, "home source crashed while enabling notifications");
            result
        }
    }

    fn read_value(
        &self,
        service: &SourceHandle,
        category: CharacteristicCategory,
    ) -> impl Future<Output = Result<Option<CharacteristicValue>, MirrorError>> + Send {
        let result = self
            .record(format!("read {service} {category}"))
            .map(|()| self.value(service, category));
        async move { result }
    }

    fn write_value(
        &self,
        service: &SourceHandle,
        category: CharacteristicCategory,
        value: CharacteristicValue,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("write {service} {category} {value}"));
        if result.is_ok() {
            self.store_value(service, category, value);
        }
        async move { result }
    }

    fn rename(
        &self,
        object: &SourceHandle,
        name: &str,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("rename {object} {name}"));
        async move { result }
    }

    fn add_home(&self, name: &str) -> impl Future<Output = Result<Home, MirrorError>> + Send {
        let result = self.record(format!("add_home {name}")).map(|()| {
            let home = live_home(name, Vec::new());
            self.homes_guard().push(home.clone());
            home
        });
        async move { result }
    }

    fn remove_home(
        &self,
        home: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("remove_home {home}"));
        if result.is_ok() {
            self.homes_guard()
                .retain(|h| h.backing().handle() != Some(home));
        }
        async move { result }
    }

    fn update_primary_home(
        &self,
        home: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("update_primary_home {home}"));
        async move { result }
    }

    fn add_room(
        &self,
        home: &SourceHandle,
        name: &str,
    ) -> impl Future<Output = Result<Room, MirrorError>> + Send {
        let result = self.record(format!("add_room {home} {name}")).and_then(|()| {
            Room::builder()
                .name(name)
                .backing(Backing::Live(SourceHandle::new(format!("room:{name}"))))
                .build()
        });
        async move { result }
    }

    fn remove_room(
        &self,
        home: &SourceHandle,
        room: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("remove_room {home} {room}"));
        async move { result }
    }

    fn add_zone(
        &self,
        home: &SourceHandle,
        name: &str,
    ) -> impl Future<Output = Result<Zone, MirrorError>> + Send {
        let result = self
            .record(format!("add_zone {home} {name}"))
            .and_then(|()| Zone::new(Some(name.to_string()), Vec::new()))
            .map(|zone| {
                zone.with_backing(Backing::Live(SourceHandle::new(format!("zone:{name}"))))
            });
        async move { result }
    }

    fn remove_zone(
        &self,
        home: &SourceHandle,
        zone: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("remove_zone {home} {zone}"));
        async move { result }
    }

    fn add_room_to_zone(
        &self,
        zone: &SourceHandle,
        room: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("add_room_to_zone {zone} {room}"));
        async move { result }
    }

    fn remove_room_from_zone(
        &self,
        zone: &SourceHandle,
        room: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("remove_room_from_zone {zone} {room}"));
        async move { result }
    }

    fn execute_action_set(
        &self,
        home: &SourceHandle,
        action_set: &SourceHandle,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("execute {home} {action_set}"));
        async move { result }
    }

    fn enable_trigger(
        &self,
        trigger: &SourceHandle,
        enabled: bool,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send {
        let result = self.record(format!("enable_trigger {trigger} {enabled}"));
        async move { result }
    }
}
