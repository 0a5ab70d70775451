//! Home: the root of the mirrored object graph.
//!
//! A home owns its rooms (each holding accessories), the accessories not yet
//! assigned to a room, its zones, scenes, triggers and service groups. The
//! query helpers here are what the subscription facade enumerates when a
//! caller subscribes across a whole home.

use serde::{Deserialize, Serialize};

use crate::accessory::Accessory;
use crate::action_set::ActionSet;
use crate::backing::{Backing, impl_mirrored};
use crate::error::{MirrorError, ValidationError};
use crate::id::{
    AccessoryId, ActionSetId, HomeId, RoomId, ServiceGroupId, ServiceId, TriggerId, ZoneId,
};
use crate::room::Room;
use crate::service::{Service, ServiceCategory};
use crate::service_group::ServiceGroup;
use crate::trigger::Trigger;
use crate::zone::Zone;

/// Reachability of the home hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeHubState {
    #[default]
    NotAvailable,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Home {
    id: HomeId,
    backing: Backing,
    name: String,
    is_primary: bool,
    hub_state: HomeHubState,
    zones: Vec<Zone>,
    rooms: Vec<Room>,
    unassigned: Vec<Accessory>,
    action_sets: Vec<ActionSet>,
    triggers: Vec<Trigger>,
    service_groups: Vec<ServiceGroup>,
}

impl_mirrored!(Home, HomeId, "Home");

impl Home {
    /// Create a builder for constructing a [`Home`].
    #[must_use]
    pub fn builder() -> HomeBuilder {
        HomeBuilder::default()
    }

    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn set_primary(&mut self, is_primary: bool) {
        self.is_primary = is_primary;
    }

    #[must_use]
    pub fn hub_state(&self) -> HomeHubState {
        self.hub_state
    }

    pub fn set_hub_state(&mut self, state: HomeHubState) {
        self.hub_state = state;
    }

    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Accessories not assigned to any room.
    #[must_use]
    pub fn unassigned_accessories(&self) -> &[Accessory] {
        &self.unassigned
    }

    #[must_use]
    pub fn action_sets(&self) -> &[ActionSet] {
        &self.action_sets
    }

    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    #[must_use]
    pub fn service_groups(&self) -> &[ServiceGroup] {
        &self.service_groups
    }

    /// Every accessory in the home, room by room, then unassigned ones.
    pub fn accessories(&self) -> impl Iterator<Item = &Accessory> + '_ {
        self.rooms
            .iter()
            .flat_map(Room::accessories)
            .chain(self.unassigned.iter())
    }

    fn accessories_mut(&mut self) -> impl Iterator<Item = &mut Accessory> + '_ {
        self.rooms
            .iter_mut()
            .flat_map(Room::accessories_mut)
            .chain(self.unassigned.iter_mut())
    }

    /// Accessories whose primary service is one of `categories` (all when
    /// empty), optionally restricted to one room.
    #[must_use]
    pub fn accessories_of(
        &self,
        categories: &[ServiceCategory],
        room: Option<RoomId>,
    ) -> Vec<&Accessory> {
        self.accessories()
            .filter(|a| {
                categories.is_empty()
                    || a
                        .primary_service()
                        .is_some_and(|s| categories.contains(&s.category()))
            })
            .filter(|a| room.is_none_or(|room| a.room_id() == Some(room)))
            .collect()
    }

    /// Every service of every accessory.
    pub fn services(&self) -> impl Iterator<Item = &Service> + '_ {
        self.accessories().flat_map(Accessory::services)
    }

    /// Services of the given categories, optionally restricted to one room.
    #[must_use]
    pub fn services_of(
        &self,
        categories: &[ServiceCategory],
        room: Option<RoomId>,
    ) -> Vec<&Service> {
        self.accessories()
            .filter(|a| room.is_none_or(|room| a.room_id() == Some(room)))
            .flat_map(Accessory::services)
            .filter(|s| categories.contains(&s.category()))
            .collect()
    }

    #[must_use]
    pub fn accessory(&self, id: AccessoryId) -> Option<&Accessory> {
        self.accessories().find(|a| a.id() == id)
    }

    pub fn accessory_mut(&mut self, id: AccessoryId) -> Option<&mut Accessory> {
        self.accessories_mut().find(|a| a.id() == id)
    }

    #[must_use]
    pub fn service(&self, id: ServiceId) -> Option<&Service> {
        self.services().find(|s| s.id() == id)
    }

    pub fn service_mut(&mut self, id: ServiceId) -> Option<&mut Service> {
        self.accessories_mut()
            .flat_map(Accessory::services_mut)
            .find(|s| s.id() == id)
    }

    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id() == id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id() == id)
    }

    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id() == id)
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| z.id() == id)
    }

    #[must_use]
    pub fn action_set(&self, id: ActionSetId) -> Option<&ActionSet> {
        self.action_sets.iter().find(|a| a.id() == id)
    }

    pub fn action_set_mut(&mut self, id: ActionSetId) -> Option<&mut ActionSet> {
        self.action_sets.iter_mut().find(|a| a.id() == id)
    }

    #[must_use]
    pub fn trigger(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.id() == id)
    }

    pub fn trigger_mut(&mut self, id: TriggerId) -> Option<&mut Trigger> {
        self.triggers.iter_mut().find(|t| t.id() == id)
    }

    pub fn service_group_mut(&mut self, id: ServiceGroupId) -> Option<&mut ServiceGroup> {
        self.service_groups.iter_mut().find(|g| g.id() == id)
    }

    /// Zones that contain `room`.
    #[must_use]
    pub fn zones_containing(&self, room: RoomId) -> Vec<&Zone> {
        self.zones.iter().filter(|z| z.contains(room)).collect()
    }

    /// Rooms referenced by `zone`, in the zone's order.
    #[must_use]
    pub fn rooms_in(&self, zone: ZoneId) -> Vec<&Room> {
        self.zone(zone)
            .map(|z| z.room_ids().iter().filter_map(|id| self.room(*id)).collect())
            .unwrap_or_default()
    }

    pub fn push_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    /// Remove a room. Its accessories become unassigned and zones forget it.
    pub fn remove_room(&mut self, id: RoomId) -> Option<Room> {
        let index = self.rooms.iter().position(|r| r.id() == id)?;
        let room = self.rooms.remove(index);
        for zone in &mut self.zones {
            zone.remove_room(id);
        }
        self.unassigned.extend(room.accessories().iter().cloned().map(|mut a| {
            a.set_room_id(None);
            a
        }));
        Some(room)
    }

    pub fn push_zone(&mut self, zone: Zone) {
        self.zones.push(zone);
    }

    pub fn remove_zone(&mut self, id: ZoneId) -> Option<Zone> {
        let index = self.zones.iter().position(|z| z.id() == id)?;
        Some(self.zones.remove(index))
    }

    pub fn push_accessory(&mut self, accessory: Accessory) {
        match accessory.room_id().and_then(|id| self.room_mut(id)) {
            Some(room) => room.push_accessory(accessory),
            None => self.unassigned.push(accessory),
        }
    }

    pub fn push_action_set(&mut self, action_set: ActionSet) {
        self.action_sets.push(action_set);
    }

    pub fn push_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    pub fn push_service_group(&mut self, group: ServiceGroup) {
        self.service_groups.push(group);
    }

    /// Visit every mirrored object of the home, the home first.
    ///
    /// Sources use this to adopt a detached graph by assigning live handles.
    pub fn for_each_backing_mut(
        &mut self,
        mut visit: impl FnMut(&'static str, String, &mut Backing),
    ) {
        visit("home", self.id.to_string(), &mut self.backing);
        for zone in &mut self.zones {
            let id = zone.id().to_string();
            visit("zone", id, zone.backing_mut());
        }
        for room in &mut self.rooms {
            let id = room.id().to_string();
            visit("room", id, room.backing_mut());
        }
        for accessory in self
            .rooms
            .iter_mut()
            .flat_map(Room::accessories_mut)
            .chain(self.unassigned.iter_mut())
        {
            let id = accessory.id().to_string();
            visit("accessory", id, accessory.backing_mut());
            for service in accessory.services_mut() {
                let id = service.id().to_string();
                visit("service", id, service.backing_mut());
            }
        }
        for action_set in &mut self.action_sets {
            let id = action_set.id().to_string();
            visit("action_set", id, action_set.backing_mut());
        }
        for trigger in &mut self.triggers {
            let id = trigger.id().to_string();
            visit("trigger", id, trigger.backing_mut());
        }
        for group in &mut self.service_groups {
            let id = group.id().to_string();
            visit("service_group", id, group.backing_mut());
        }
    }
}

/// Step-by-step builder for [`Home`].
#[derive(Debug, Default)]
pub struct HomeBuilder {
    id: Option<HomeId>,
    backing: Backing,
    name: Option<String>,
    is_primary: bool,
    hub_state: HomeHubState,
    zones: Vec<Zone>,
    rooms: Vec<Room>,
    unassigned: Vec<Accessory>,
    action_sets: Vec<ActionSet>,
    triggers: Vec<Trigger>,
    service_groups: Vec<ServiceGroup>,
}

impl HomeBuilder {
    #[must_use]
    pub fn id(mut self, id: HomeId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn backing(mut self, backing: Backing) -> Self {
        self.backing = backing;
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    #[must_use]
    pub fn hub_state(mut self, state: HomeHubState) -> Self {
        self.hub_state = state;
        self
    }

    #[must_use]
    pub fn zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    #[must_use]
    pub fn room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Add an accessory that belongs to no room.
    #[must_use]
    pub fn accessory(mut self, accessory: Accessory) -> Self {
        self.unassigned.push(accessory);
        self
    }

    #[must_use]
    pub fn action_set(mut self, action_set: ActionSet) -> Self {
        self.action_sets.push(action_set);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    #[must_use]
    pub fn service_group(mut self, group: ServiceGroup) -> Self {
        self.service_groups.push(group);
        self
    }

    /// Consume the builder, validate, and return a [`Home`].
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Home, MirrorError> {
        let name = self.name.unwrap_or_default();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Home {
            id: self.id.unwrap_or_default(),
            backing: self.backing,
            name,
            is_primary: self.is_primary,
            hub_state: self.hub_state,
            zones: self.zones,
            rooms: self.rooms,
            unassigned: self.unassigned,
            action_sets: self.action_sets,
            triggers: self.triggers,
            service_groups: self.service_groups,
        })
    }
}
