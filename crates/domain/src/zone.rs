//! Zone: a named grouping of rooms (e.g. "Ground floor").

use serde::{Deserialize, Serialize};

use crate::backing::{Backing, impl_mirrored};
use crate::error::{MirrorError, ValidationError};
use crate::id::{RoomId, ZoneId};
use crate::naming::generated_name;

/// A zone referencing the rooms it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    id: ZoneId,
    backing: Backing,
    name: String,
    room_ids: Vec<RoomId>,
}

impl_mirrored!(Zone, ZoneId, "Zone");

impl Zone {
    /// A zone named `name`, or a generated name when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] if the provided name is empty.
    pub fn new(name: Option<String>, room_ids: Vec<RoomId>) -> Result<Self, MirrorError> {
        let name = match name {
            Some(name) if name.is_empty() => return Err(ValidationError::EmptyName.into()),
            Some(name) => name,
            None => generated_name("Zone"),
        };
        Ok(Self {
            id: ZoneId::new(),
            backing: Backing::Detached,
            name,
            room_ids,
        })
    }

    #[must_use]
    pub fn with_backing(mut self, backing: Backing) -> Self {
        self.backing = backing;
        self
    }

    #[must_use]
    pub fn room_ids(&self) -> &[RoomId] {
        &self.room_ids
    }

    #[must_use]
    pub fn contains(&self, room: RoomId) -> bool {
        self.room_ids.contains(&room)
    }

    /// Add a room; returns `false` if it was already present.
    pub fn add_room(&mut self, room: RoomId) -> bool {
        if self.contains(room) {
            return false;
        }
        self.room_ids.push(room);
        true
    }

    /// Remove a room; returns `false` if it was absent.
    pub fn remove_room(&mut self, room: RoomId) -> bool {
        let before = self.room_ids.len();
        self.room_ids.retain(|id| *id != room);
        self.room_ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_not_add_room_twice() {
        let room = RoomId::new();
        let mut zone = Zone::new(Some("Outside".into()), vec![]).unwrap();
        assert!(zone.add_room(room));
        assert!(!zone.add_room(room));
        assert_eq!(zone.room_ids(), &[room]);
    }

    #[test]
    fn should_report_missing_room_when_removing() {
        let room = RoomId::new();
        let mut zone = Zone::new(None, vec![room]).unwrap();
        assert!(zone.name().starts_with("Zone "));
        assert!(zone.remove_room(room));
        assert!(!zone.remove_room(room));
    }
}
