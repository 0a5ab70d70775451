//! Room: a named place in a home holding accessories.

use serde::{Deserialize, Serialize};

use crate::accessory::Accessory;
use crate::backing::{Backing, impl_mirrored};
use crate::error::{MirrorError, ValidationError};
use crate::id::{AccessoryId, RoomId};
use crate::naming::generated_name;

/// A room and the accessories assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    id: RoomId,
    backing: Backing,
    name: String,
    accessories: Vec<Accessory>,
}

impl_mirrored!(Room, RoomId, "Room");

impl Room {
    /// Create a builder for constructing a [`Room`].
    #[must_use]
    pub fn builder() -> RoomBuilder {
        RoomBuilder::default()
    }

    #[must_use]
    pub fn accessories(&self) -> &[Accessory] {
        &self.accessories
    }

    pub fn accessories_mut(&mut self) -> &mut [Accessory] {
        &mut self.accessories
    }

    #[must_use]
    pub fn accessory(&self, id: AccessoryId) -> Option<&Accessory> {
        self.accessories.iter().find(|a| a.id() == id)
    }

    /// Move an accessory into this room.
    pub fn push_accessory(&mut self, mut accessory: Accessory) {
        accessory.set_room_id(Some(self.id));
        self.accessories.push(accessory);
    }
}

/// Step-by-step builder for [`Room`].
#[derive(Debug, Default)]
pub struct RoomBuilder {
    id: Option<RoomId>,
    backing: Backing,
    name: Option<String>,
    accessories: Vec<Accessory>,
}

impl RoomBuilder {
    #[must_use]
    pub fn id(mut self, id: RoomId) -> Self {
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
    pub fn accessory(mut self, accessory: Accessory) -> Self {
        self.accessories.push(accessory);
        self
    }

    /// Consume the builder, validate, and return a [`Room`].
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] if the provided name is empty.
    pub fn build(self) -> Result<Room, MirrorError> {
        let name = match self.name {
            Some(name) if name.is_empty() => return Err(ValidationError::EmptyName.into()),
            Some(name) => name,
            None => generated_name("Room"),
        };
        let mut room = Room {
            id: self.id.unwrap_or_default(),
            backing: self.backing,
            name,
            accessories: Vec::with_capacity(self.accessories.len()),
        };
        for accessory in self.accessories {
            room.push_accessory(accessory);
        }
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_assign_accessories_to_room() {
        let room = Room::builder()
            .name("Kitchen")
            .accessory(Accessory::builder().name("Toaster").build().unwrap())
            .build()
            .unwrap();
        assert_eq!(room.accessories()[0].room_id(), Some(room.id()));
    }

    #[test]
    fn should_generate_room_name_when_missing() {
        let room = Room::builder().build().unwrap();
        assert!(room.name().starts_with("Room "));
    }

    #[test]
    fn should_reject_empty_name() {
        assert!(Room::builder().name("").build().is_err());
    }
}
