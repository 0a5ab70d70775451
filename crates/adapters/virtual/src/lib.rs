//! # hkmirror-adapter-virtual
//!
//! In-memory home source used for demos, previews and tests.
//!
//! [`VirtualHome`] owns a graph of homes and answers every [`HomeSource`]
//! request against it. Detached homes handed to it are *adopted*: every
//! object receives a live handle of the form `"<kind>:<id>"`, e.g.
//! `"room:6f1c…"`.
//!
//! Changes are pushed back to the core as [`SourceEvent`]s on an unbounded
//! channel. Value changes are only reported for characteristics that were
//! armed through [`HomeSource::enable_notification`], which mirrors how a
//! real framework stays silent about characteristics nobody asked for.
//!
//! ## Dependency rule
//!
//! Depends on `hkmirror-app` (port traits) and `hkmirror-domain` only.

pub mod previews;

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use hkmirror_app::ports::{HomeSource, SourceEvent};
use hkmirror_domain::backing::{Backing, Mirrored, SourceHandle};
use hkmirror_domain::characteristic::{CharacteristicCategory, CharacteristicValue};
use hkmirror_domain::error::{MirrorError, NotFoundError, ValidationError};
use hkmirror_domain::home::Home;
use hkmirror_domain::id::{
    AccessoryId, ActionSetId, HomeId, RoomId, ServiceGroupId, ServiceId, TriggerId, ZoneId,
};
use hkmirror_domain::room::Room;
use hkmirror_domain::service::{Service, ServiceCategory};
use hkmirror_domain::time::now;
use hkmirror_domain::zone::Zone;

/// Give every detached object of `home` a live handle.
fn adopt(home: &mut Home) {
    home.for_each_backing_mut(|kind, id, backing| {
        if !backing.is_live() {
            *backing = Backing::Live(SourceHandle::new(format!("{kind}:{id}")));
        }
    });
}

fn unknown(kind: &'static str, handle: &SourceHandle) -> MirrorError {
    NotFoundError {
        entity: kind,
        id: handle.to_string(),
    }
    .into()
}

/// Extract the id of a handle of the given kind.
fn parse_handle<I: FromStr>(handle: &SourceHandle, kind: &'static str) -> Result<I, MirrorError> {
    handle
        .as_str()
        .split_once(':')
        .filter(|(k, _)| *k == kind)
        .and_then(|(_, id)| id.parse().ok())
        .ok_or_else(|| unknown(kind, handle))
}

#[derive(Default)]
struct State {
    homes: Vec<Home>,
    armed: HashSet<(ServiceId, CharacteristicCategory)>,
    failing: HashSet<CharacteristicCategory>,
    enable_requests: usize,
}

impl State {
    fn home(&self, id: HomeId) -> Option<&Home> {
        self.homes.iter().find(|h| h.id() == id)
    }

    fn home_by_handle(&mut self, handle: &SourceHandle) -> Result<&mut Home, MirrorError> {
        let id: HomeId = parse_handle(handle, "home")?;
        self.homes
            .iter_mut()
            .find(|h| h.id() == id)
            .ok_or_else(|| unknown("home", handle))
    }

    fn primary(&self) -> Option<&Home> {
        self.homes.iter().find(|h| h.is_primary())
    }

    fn service_mut(&mut self, id: ServiceId) -> Option<&mut Service> {
        self.homes.iter_mut().find_map(|h| h.service_mut(id))
    }

    fn zone_mut(&mut self, handle: &SourceHandle) -> Result<&mut Zone, MirrorError> {
        let id: ZoneId = parse_handle(handle, "zone")?;
        self.homes
            .iter_mut()
            .find_map(|h| h.zone_mut(id))
            .ok_or_else(|| unknown("zone", handle))
    }

    /// Apply `rename` to whatever object `handle` designates.
    fn rename(&mut self, handle: &SourceHandle, name: &str) -> Result<(), MirrorError> {
        let kind = handle.as_str().split_once(':').map_or("", |(kind, _)| kind);
        let name = name.to_string();
        let renamed = match kind {
            "home" => {
                self.home_by_handle(handle)?.set_name(name);
                true
            }
            "zone" => {
                self.zone_mut(handle)?.set_name(name);
                true
            }
            "room" => {
                let id: RoomId = parse_handle(handle, "room")?;
                set_name(self.homes.iter_mut().find_map(|h| h.room_mut(id)), name)
            }
            "accessory" => {
                let id: AccessoryId = parse_handle(handle, "accessory")?;
                set_name(self.homes.iter_mut().find_map(|h| h.accessory_mut(id)), name)
            }
            "service" => {
                let id: ServiceId = parse_handle(handle, "service")?;
                set_name(self.service_mut(id), name)
            }
            "action_set" => {
                let id: ActionSetId = parse_handle(handle, "action_set")?;
                set_name(self.homes.iter_mut().find_map(|h| h.action_set_mut(id)), name)
            }
            "trigger" => {
                let id: TriggerId = parse_handle(handle, "trigger")?;
                set_name(self.homes.iter_mut().find_map(|h| h.trigger_mut(id)), name)
            }
            "service_group" => {
                let id: ServiceGroupId = parse_handle(handle, "service_group")?;
                set_name(
                    self.homes.iter_mut().find_map(|h| h.service_group_mut(id)),
                    name,
                )
            }
            _ => false,
        };
        if renamed {
            Ok(())
        } else {
            Err(unknown("object", handle))
        }
    }
}

fn set_name<E: Mirrored>(entity: Option<&mut E>, name: String) -> bool {
    match entity {
        Some(entity) => {
            entity.set_name(name);
            true
        }
        None => false,
    }
}

/// A simulated home-automation framework.
pub struct VirtualHome {
    state: Mutex<State>,
    events: mpsc::UnboundedSender<SourceEvent>,
}

impl VirtualHome {
    /// Create a source owning `homes` (adopted on the way in), together with
    /// the receiving end of its event channel.
    ///
    /// When none of the homes is flagged primary, the first one becomes the
    /// primary home.
    #[must_use]
    pub fn new(homes: Vec<Home>) -> (Self, mpsc::UnboundedReceiver<SourceEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let mut homes = homes;
        homes.iter_mut().for_each(adopt);
        let has_primary = homes.iter().any(Home::is_primary);
        if let Some(first) = homes.first_mut().filter(|_| !has_primary) {
            first.set_primary(true);
        }
        let state = State {
            homes,
            ..State::default()
        };
        (
            Self {
                state: Mutex::new(state),
                events,
            },
            receiver,
        )
    }

    /// A source serving the [preview home](previews::home).
    ///
    /// # Errors
    ///
    /// Returns a validation error if the fixtures fail to build.
    pub fn preview() -> Result<(Self, mpsc::UnboundedReceiver<SourceEvent>), MirrorError> {
        Ok(Self::new(vec![previews::home()?]))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SourceEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("no one listens to the virtual home anymore");
        }
    }

    /// Report the current set of homes, as a framework does once it finished
    /// loading.
    pub fn announce(&self) {
        let primary = self.lock().primary().cloned();
        tracing::info!(
            primary = primary.as_ref().map(Home::name),
            "announcing homes"
        );
        self.emit(SourceEvent::HomesUpdated { primary });
    }

    /// Simulate a change made outside the mirror (a physical switch, a
    /// sensor reading).
    ///
    /// The snapshot is updated in any case; an event is emitted only if the
    /// characteristic was armed. Returns whether an event was emitted.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if no home holds the service or the
    /// service has no such characteristic.
    pub fn set_value(
        &self,
        service: ServiceId,
        category: CharacteristicCategory,
        value: CharacteristicValue,
    ) -> Result<bool, MirrorError> {
        let event = {
            let mut state = self.lock();
            let armed = state.armed.contains(&(service, category));
            let target = state.service_mut(service).ok_or_else(|| NotFoundError {
                entity: "Service",
                id: service.to_string(),
            })?;
            if !target.set_value(category, Some(value.clone())) {
                return Err(NotFoundError {
                    entity: "Characteristic",
                    id: format!("{category} of service {service}"),
                }
                .into());
            }
            armed.then(|| SourceEvent::ValueChanged {
                service: target.clone(),
                characteristic_type: category.wire_id().to_string(),
                value: Some(value),
            })
        };
        let emitted = event.is_some();
        if let Some(event) = event {
            self.emit(event);
        } else {
            tracing::debug!(
                %service,
                characteristic = %category,
                "change of an unarmed characteristic"
            );
        }
        Ok(emitted)
    }

    /// Simulate a trigger going off: its fire date is recorded and the
    /// scenes it points at are run. Disabled triggers do nothing.
    ///
    /// Returns whether the trigger fired.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if no home holds the trigger.
    pub fn fire_trigger(&self, trigger: TriggerId) -> Result<bool, MirrorError> {
        let mut state = self.lock();
        let home = state
            .homes
            .iter_mut()
            .find(|h| h.trigger(trigger).is_some())
            .ok_or_else(|| NotFoundError {
                entity: "Trigger",
                id: trigger.to_string(),
            })?;
        let Some(target) = home.trigger_mut(trigger).filter(|t| t.is_enabled()) else {
            return Ok(false);
        };
        target.record_fire(now());
        let scenes = target.action_set_ids().to_vec();
        for scene in scenes.iter().filter_map(|id| home.action_set(*id)) {
            tracing::info!(scene = scene.name(), trigger = %trigger, "trigger fired scene");
        }
        Ok(true)
    }

    /// Make every future arming request for `category` fail.
    pub fn fail_notifications_for(&self, category: CharacteristicCategory) {
        self.lock().failing.insert(category);
    }

    /// Number of arming requests that reached the source.
    #[must_use]
    pub fn enable_requests(&self) -> usize {
        self.lock().enable_requests
    }

    /// Whether the source delivers changes of `(service, category)`.
    #[must_use]
    pub fn is_armed(&self, service: ServiceId, category: CharacteristicCategory) -> bool {
        self.lock().armed.contains(&(service, category))
    }
}

impl HomeSource for VirtualHome {
    fn homes(&self) -> Vec<Home> {
        self.lock().homes.clone()
    }

    fn services(&self, home: &Home, categories: &[ServiceCategory]) -> Vec<Service> {
        let state = self.lock();
        let home = state.home(home.id()).unwrap_or(home);
        home.services_of(categories, None)
            .into_iter()
            .cloned()
            .collect()
    }

    async fn enable_notification(
        &self,
        service: &SourceHandle,
        service_id: ServiceId,
        category: CharacteristicCategory,
    ) -> Result<(), MirrorError> {
        let mut state = self.lock();
        state.enable_requests += 1;
        if state.failing.contains(&category) {
            return Err(MirrorError::from_source(std::io::Error::other(format!(
                "notifications for {category} are unavailable"
            ))));
        }
        let known = state
            .service_mut(service_id)
            .is_some_and(|s| s.characteristic(category).is_some());
        if !known {
            return Err(unknown("service", service));
        }
        state.armed.insert((service_id, category));
        Ok(())
    }

    async fn read_value(
        &self,
        service: &SourceHandle,
        category: CharacteristicCategory,
    ) -> Result<Option<CharacteristicValue>, MirrorError> {
        let id: ServiceId = parse_handle(service, "service")?;
        let mut state = self.lock();
        let target = state
            .service_mut(id)
            .ok_or_else(|| unknown("service", service))?;
        Ok(target.value(category).cloned())
    }

    async fn write_value(
        &self,
        service: &SourceHandle,
        category: CharacteristicCategory,
        value: CharacteristicValue,
    ) -> Result<(), MirrorError> {
        let id: ServiceId = parse_handle(service, "service")?;
        let mut state = self.lock();
        let target = state
            .service_mut(id)
            .ok_or_else(|| unknown("service", service))?;
        if !target
            .characteristic(category)
            .is_some_and(|c| c.properties().writable)
        {
            return Err(ValidationError::NotWritable(category.to_string()).into());
        }
        target.set_value(category, Some(value));
        Ok(())
    }

    async fn rename(&self, object: &SourceHandle, name: &str) -> Result<(), MirrorError> {
        self.lock().rename(object, name)
    }

    async fn add_home(&self, name: &str) -> Result<Home, MirrorError> {
        let mut home = Home::builder().name(name).build()?;
        adopt(&mut home);
        self.lock().homes.push(home.clone());
        self.emit(SourceEvent::HomeAdded { home: home.clone() });
        Ok(home)
    }

    async fn remove_home(&self, home: &SourceHandle) -> Result<(), MirrorError> {
        let id: HomeId = parse_handle(home, "home")?;
        {
            let mut state = self.lock();
            let index = state
                .homes
                .iter()
                .position(|h| h.id() == id)
                .ok_or_else(|| unknown("home", home))?;
            state.homes.remove(index);
        }
        self.emit(SourceEvent::HomeRemoved { home_id: id });
        Ok(())
    }

    async fn update_primary_home(&self, home: &SourceHandle) -> Result<(), MirrorError> {
        let id: HomeId = parse_handle(home, "home")?;
        let primary = {
            let mut state = self.lock();
            if state.home(id).is_none() {
                return Err(unknown("home", home));
            }
            for h in &mut state.homes {
                h.set_primary(h.id() == id);
            }
            state.home(id).cloned()
        };
        if let Some(primary) = primary {
            self.emit(SourceEvent::PrimaryHomeUpdated { primary });
        }
        Ok(())
    }

    async fn add_room(&self, home: &SourceHandle, name: &str) -> Result<Room, MirrorError> {
        let mut state = self.lock();
        let target = state.home_by_handle(home)?;
        let mut room = Room::builder().name(name).build()?;
        room.set_backing(Backing::Live(SourceHandle::new(format!("room:{}", room.id()))));
        target.push_room(room.clone());
        Ok(room)
    }

    async fn remove_room(
        &self,
        home: &SourceHandle,
        room: &SourceHandle,
    ) -> Result<(), MirrorError> {
        let id: RoomId = parse_handle(room, "room")?;
        let mut state = self.lock();
        state
            .home_by_handle(home)?
            .remove_room(id)
            .map(|_| ())
            .ok_or_else(|| unknown("room", room))
    }

    async fn add_zone(&self, home: &SourceHandle, name: &str) -> Result<Zone, MirrorError> {
        let mut state = self.lock();
        let target = state.home_by_handle(home)?;
        let mut zone = Zone::new(Some(name.to_string()), Vec::new())?;
        zone.set_backing(Backing::Live(SourceHandle::new(format!("zone:{}", zone.id()))));
        target.push_zone(zone.clone());
        Ok(zone)
    }

    async fn remove_zone(
        &self,
        home: &SourceHandle,
        zone: &SourceHandle,
    ) -> Result<(), MirrorError> {
        let id: ZoneId = parse_handle(zone, "zone")?;
        let mut state = self.lock();
        state
            .home_by_handle(home)?
            .remove_zone(id)
            .map(|_| ())
            .ok_or_else(|| unknown("zone", zone))
    }

    async fn add_room_to_zone(
        &self,
        zone: &SourceHandle,
        room: &SourceHandle,
    ) -> Result<(), MirrorError> {
        let room_id: RoomId = parse_handle(room, "room")?;
        self.lock().zone_mut(zone)?.add_room(room_id);
        Ok(())
    }

    async fn remove_room_from_zone(
        &self,
        zone: &SourceHandle,
        room: &SourceHandle,
    ) -> Result<(), MirrorError> {
        let room_id: RoomId = parse_handle(room, "room")?;
        self.lock().zone_mut(zone)?.remove_room(room_id);
        Ok(())
    }

    async fn execute_action_set(
        &self,
        home: &SourceHandle,
        action_set: &SourceHandle,
    ) -> Result<(), MirrorError> {
        let id: ActionSetId = parse_handle(action_set, "action_set")?;
        let mut state = self.lock();
        let scene = state
            .home_by_handle(home)?
            .action_set(id)
            .ok_or_else(|| unknown("action_set", action_set))?;
        tracing::info!(scene = scene.name(), actions = scene.action_count(), "executing scene");
        Ok(())
    }

    async fn enable_trigger(
        &self,
        trigger: &SourceHandle,
        enabled: bool,
    ) -> Result<(), MirrorError> {
        let id: TriggerId = parse_handle(trigger, "trigger")?;
        let mut state = self.lock();
        let target = state
            .homes
            .iter_mut()
            .find_map(|h| h.trigger_mut(id))
            .ok_or_else(|| unknown("trigger", trigger))?;
        target.set_enabled(enabled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview() -> (VirtualHome, mpsc::UnboundedReceiver<SourceEvent>) {
        VirtualHome::preview().unwrap()
    }

    fn first_light(source: &VirtualHome) -> Service {
        let home = source.homes().remove(0);
        source.services(&home, &[ServiceCategory::Lightbulb]).remove(0)
    }

    #[test]
    fn should_adopt_every_object_of_a_detached_home() {
        let (source, _events) = preview();

        let mut home = source.homes().remove(0);
        let mut detached = 0;
        home.for_each_backing_mut(|_, _, backing| detached += usize::from(!backing.is_live()));
        assert_eq!(detached, 0);
        assert_eq!(
            home.backing().handle().map(SourceHandle::as_str),
            Some(format!("home:{}", home.id()).as_str())
        );
    }

    #[test]
    fn should_flag_first_home_as_primary() {
        let home = Home::builder().name("Cabin").build().unwrap();
        let (source, _events) = VirtualHome::new(vec![home]);

        assert!(source.homes()[0].is_primary());
    }

    #[test]
    fn should_announce_primary_home() {
        let (source, mut events) = preview();

        source.announce();

        match events.try_recv().unwrap() {
            SourceEvent::HomesUpdated { primary } => {
                assert_eq!(primary.unwrap().name(), previews::HOME_NAME);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn should_enumerate_services_by_category() {
        let (source, _events) = preview();
        let home = source.homes().remove(0);

        assert_eq!(source.services(&home, &[ServiceCategory::Lightbulb]).len(), 4);
        assert_eq!(source.services(&home, ServiceCategory::ALL).len(), previews::SERVICE_COUNT);
        assert!(source.services(&home, &[]).is_empty());
    }

    #[tokio::test]
    async fn should_only_report_armed_characteristics() {
        let (source, mut events) = preview();
        let light = first_light(&source);

        let emitted = source
            .set_value(light.id(), CharacteristicCategory::PowerState, true.into())
            .unwrap();
        assert!(!emitted);
        assert!(events.try_recv().is_err());

        source
            .enable_notification(
                light.backing().handle().unwrap(),
                light.id(),
                CharacteristicCategory::PowerState,
            )
            .await
            .unwrap();
        let emitted = source
            .set_value(light.id(), CharacteristicCategory::PowerState, false.into())
            .unwrap();

        assert!(emitted);
        match events.try_recv().unwrap() {
            SourceEvent::ValueChanged {
                service,
                characteristic_type,
                value,
            } => {
                assert_eq!(service.id(), light.id());
                assert_eq!(characteristic_type, CharacteristicCategory::PowerState.wire_id());
                assert_eq!(value, Some(CharacteristicValue::Bool(false)));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_fail_arming_when_category_is_unavailable() {
        let (source, _events) = preview();
        source.fail_notifications_for(CharacteristicCategory::PowerState);
        let light = first_light(&source);

        let result = source
            .enable_notification(
                light.backing().handle().unwrap(),
                light.id(),
                CharacteristicCategory::PowerState,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(source.enable_requests(), 1);
        assert!(!source.is_armed(light.id(), CharacteristicCategory::PowerState));
    }

    #[tokio::test]
    async fn should_write_and_read_back_value() {
        let (source, _events) = preview();
        let light = first_light(&source);
        let handle = light.backing().handle().unwrap();

        source
            .write_value(handle, CharacteristicCategory::PowerState, true.into())
            .await
            .unwrap();

        assert_eq!(
            source
                .read_value(handle, CharacteristicCategory::PowerState)
                .await
                .unwrap(),
            Some(CharacteristicValue::Bool(true))
        );
    }

    #[tokio::test]
    async fn should_refuse_writing_sensor_reading() {
        let (source, _events) = preview();
        let home = source.homes().remove(0);
        let sensor = source.services(&home, &[ServiceCategory::ContactSensor]).remove(0);

        let result = source
            .write_value(
                sensor.backing().handle().unwrap(),
                CharacteristicCategory::ContactState,
                CharacteristicValue::Int(1),
            )
            .await;

        assert!(matches!(result, Err(MirrorError::Validation(_))));
    }

    #[tokio::test]
    async fn should_rename_any_object_by_handle() {
        let (source, _events) = preview();
        let home = source.homes().remove(0);
        let room = &home.rooms()[0];

        source
            .rename(room.backing().handle().unwrap(), "Scullery")
            .await
            .unwrap();
        source
            .rename(home.backing().handle().unwrap(), "Chalet")
            .await
            .unwrap();

        let home = source.homes().remove(0);
        assert_eq!(home.name(), "Chalet");
        assert_eq!(home.rooms()[0].name(), "Scullery");
    }

    #[tokio::test]
    async fn should_report_unknown_handle() {
        let (source, _events) = preview();

        let result = source.rename(&SourceHandle::new("room:nope"), "Den").await;

        assert!(matches!(result, Err(MirrorError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_emit_home_lifecycle_events() {
        let (source, mut events) = preview();

        let cabin = source.add_home("Cabin").await.unwrap();
        source
            .update_primary_home(cabin.backing().handle().unwrap())
            .await
            .unwrap();
        source
            .remove_home(cabin.backing().handle().unwrap())
            .await
            .unwrap();

        assert!(matches!(events.try_recv(), Ok(SourceEvent::HomeAdded { .. })));
        assert!(matches!(
            events.try_recv(),
            Ok(SourceEvent::PrimaryHomeUpdated { primary }) if primary.id() == cabin.id()
        ));
        assert!(matches!(
            events.try_recv(),
            Ok(SourceEvent::HomeRemoved { home_id }) if home_id == cabin.id()
        ));
        assert_eq!(source.homes().len(), 1);
    }

    #[tokio::test]
    async fn should_manage_rooms_and_zones() {
        let (source, _events) = preview();
        let home = source.homes().remove(0);
        let home_handle = home.backing().handle().unwrap();

        let attic = source.add_room(home_handle, "Attic").await.unwrap();
        let upstairs = source.add_zone(home_handle, "Upstairs").await.unwrap();
        source
            .add_room_to_zone(
                upstairs.backing().handle().unwrap(),
                attic.backing().handle().unwrap(),
            )
            .await
            .unwrap();

        let snapshot = source.homes().remove(0);
        assert_eq!(snapshot.zones_containing(attic.id()).len(), 1);

        source
            .remove_room(home_handle, attic.backing().handle().unwrap())
            .await
            .unwrap();
        let snapshot = source.homes().remove(0);
        assert!(snapshot.room(attic.id()).is_none());
        assert!(snapshot.zone(upstairs.id()).unwrap().room_ids().is_empty());
    }

    #[tokio::test]
    async fn should_toggle_trigger_and_run_scene() {
        let (source, _events) = preview();
        let home = source.homes().remove(0);
        let trigger = &home.triggers()[0];
        let scene = &home.action_sets()[0];

        source
            .enable_trigger(trigger.backing().handle().unwrap(), false)
            .await
            .unwrap();
        source
            .execute_action_set(
                home.backing().handle().unwrap(),
                scene.backing().handle().unwrap(),
            )
            .await
            .unwrap();

        assert!(!source.homes()[0].triggers()[0].is_enabled());
        assert!(!source.fire_trigger(trigger.id()).unwrap());
    }

    #[test]
    fn should_record_fire_date_when_trigger_fires() {
        let (source, _events) = preview();
        let trigger = source.homes()[0].triggers()[0].id();

        assert!(source.fire_trigger(trigger).unwrap());

        assert!(source.homes()[0].triggers()[0].last_fire_date().is_some());
    }
}
