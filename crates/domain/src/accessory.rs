//! Accessory: a physical device exposing one or more services.

use serde::{Deserialize, Serialize};

use crate::backing::{Backing, impl_mirrored};
use crate::category::wire_enum;
use crate::error::{MirrorError, ValidationError};
use crate::id::{AccessoryId, RoomId, ServiceId};
use crate::naming::generated_name;
use crate::service::Service;

wire_enum! {
    /// The category of an accessory, as shown in the home app.
    pub enum AccessoryCategory {
        Other = ("0FBA259B-05AC-46F2-875F-204ABB6D9FE7", "Other"),
        SecuritySystem = ("14D8FE28-2998-49E3-AC95-E3969BE2957C", "Security System"),
        Bridge = ("61102194-9993-48BF-A1EF-6C7DC50F0C01", "Bridge"),
        Door = ("DD4DE411-8F01-44EE-866A-1F96144DC1B6", "Door"),
        DoorLock = ("C25D5FCE-52EC-4599-A815-1192C5F08C7F", "Door Lock"),
        Fan = ("151CB559-0DF9-40AA-8A67-12AF06C4449D", "Fan"),
        GarageDoorOpener = ("604B6E52-2C87-4596-B4C9-D15077C0C07F", "Garage Door Opener"),
        IpCamera = ("C9EE63DB-2FF7-4514-826A-2FC2F0D4C9F0", "IP Camera"),
        Lightbulb = ("57D56F4D-3302-41F7-AB34-5365AA180E81", "Lightbulb"),
        Outlet = ("730F40D4-6D0E-4903-B09E-520A08AFB78C", "Outlet"),
        ProgrammableSwitch = ("3F9B944B-B8DF-4570-BAF5-CD31A8B321A7", "Programmable Switch"),
        RangeExtender = ("8E33483E-2102-4BFE-9295-0A187D114188", "Range Extender"),
        Sensor = ("772AFB8E-8D2F-455E-90E5-9852E6C4DD31", "Sensor"),
        Switch = ("2F4C3164-8DE4-4A4F-93BA-DD1D5068DF0B", "Switch"),
        Thermostat = ("79668DCF-89FB-450D-94B5-AEE70B7B09F1", "Thermostat"),
        VideoDoorbell = ("957A52E0-BE03-490C-8305-7B20C1CC17BA", "Video Doorbell"),
        Window = ("1C501511-408E-4C1E-816B-3FC011FFD5B1", "Window"),
        WindowCovering = ("2FB9EE1F-1C21-4D0B-9383-9B65F64DBF0E", "Window Covering"),
        AirPurifier = ("5510B997-D711-4636-870F-82BB61092B15", "Air Purifier"),
        AirHeater = ("BF7036FD-93CF-49B5-954F-CD2B760D11DA", "Air Heater"),
        AirConditioner = ("18DDD63A-27F9-4341-B59B-759D3D114586", "Air Conditioner"),
        AirHumidifier = ("3FEB9075-C9AF-4629-ADBC-A853259C645A", "Air Humidifier"),
        AirDehumidifier = ("1E15B639-DC98-41D4-A394-2E4A1D54AA3A", "Air Dehumidifier"),
        Sprinkler = ("94D3FBD5-0A74-4EE4-BE1A-C97E82ADFA33", "Sprinkler"),
        Faucet = ("43CE6F7E-F7E8-44B4-80CE-5786F6E6CD47", "Faucet"),
        ShowerHead = ("39D2A5B4-F9A6-43F6-90E7-0019F0C0E99F", "Shower Head"),
    }
}

impl AccessoryCategory {
    /// Resolve a wire identifier; unknown identifiers map to [`Self::Other`].
    #[must_use]
    pub fn from_wire_id_or_other(wire_id: &str) -> Self {
        Self::from_wire_id(wire_id).unwrap_or(Self::Other)
    }
}

/// A physical accessory and a snapshot of its services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Accessory {
    id: AccessoryId,
    backing: Backing,
    name: String,
    category: AccessoryCategory,
    room_id: Option<RoomId>,
    is_reachable: bool,
    is_blocked: bool,
    is_bridged: bool,
    firmware_version: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    services: Vec<Service>,
}

impl_mirrored!(Accessory, AccessoryId, "Accessory");

impl Accessory {
    /// Create a builder for constructing an [`Accessory`].
    #[must_use]
    pub fn builder() -> AccessoryBuilder {
        AccessoryBuilder::default()
    }

    #[must_use]
    pub fn category(&self) -> AccessoryCategory {
        self.category
    }

    #[must_use]
    pub fn room_id(&self) -> Option<RoomId> {
        self.room_id
    }

    pub fn set_room_id(&mut self, room_id: Option<RoomId>) {
        self.room_id = room_id;
    }

    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.is_reachable
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    #[must_use]
    pub fn is_bridged(&self) -> bool {
        self.is_bridged
    }

    #[must_use]
    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    #[must_use]
    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut [Service] {
        &mut self.services
    }

    /// First service flagged as primary.
    #[must_use]
    pub fn primary_service(&self) -> Option<&Service> {
        self.services.iter().find(|s| s.is_primary())
    }

    #[must_use]
    pub fn service(&self, id: ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| s.id() == id)
    }

    pub fn service_mut(&mut self, id: ServiceId) -> Option<&mut Service> {
        self.services.iter_mut().find(|s| s.id() == id)
    }

    /// Accessories whose name contains `query`, ignoring case.
    ///
    /// An empty query matches everything.
    #[must_use]
    pub fn find<'a>(query: &str, accessories: &'a [Accessory]) -> Vec<&'a Accessory> {
        let query = query.to_lowercase();
        accessories
            .iter()
            .filter(|a| query.is_empty() || a.name.to_lowercase().contains(&query))
            .collect()
    }
}

/// Step-by-step builder for [`Accessory`].
#[derive(Debug)]
pub struct AccessoryBuilder {
    id: Option<AccessoryId>,
    backing: Backing,
    name: Option<String>,
    category: AccessoryCategory,
    room_id: Option<RoomId>,
    is_reachable: bool,
    is_blocked: bool,
    is_bridged: bool,
    firmware_version: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    services: Vec<Service>,
}

impl Default for AccessoryBuilder {
    fn default() -> Self {
        Self {
            id: None,
            backing: Backing::Detached,
            name: None,
            category: AccessoryCategory::Other,
            room_id: None,
            is_reachable: true,
            is_blocked: false,
            is_bridged: false,
            firmware_version: None,
            manufacturer: None,
            model: None,
            services: Vec::new(),
        }
    }
}

impl AccessoryBuilder {
    #[must_use]
    pub fn id(mut self, id: AccessoryId) -> Self {
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
    pub fn category(mut self, category: AccessoryCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn room_id(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    #[must_use]
    pub fn reachable(mut self, is_reachable: bool) -> Self {
        self.is_reachable = is_reachable;
        self
    }

    #[must_use]
    pub fn blocked(mut self, is_blocked: bool) -> Self {
        self.is_blocked = is_blocked;
        self
    }

    #[must_use]
    pub fn bridged(mut self, is_bridged: bool) -> Self {
        self.is_bridged = is_bridged;
        self
    }

    #[must_use]
    pub fn firmware_version(mut self, version: impl Into<String>) -> Self {
        self.firmware_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    /// Consume the builder, validate, and return an [`Accessory`].
    ///
    /// Services are re-parented onto the new accessory id.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] if the provided name is empty.
    pub fn build(self) -> Result<Accessory, MirrorError> {
        let name = match self.name {
            Some(name) if name.is_empty() => return Err(ValidationError::EmptyName.into()),
            Some(name) => name,
            None => generated_name(self.category.description()),
        };
        let id = self.id.unwrap_or_default();
        let mut services = self.services;
        for service in &mut services {
            service.set_accessory_id(id);
        }
        Ok(Accessory {
            id,
            backing: self.backing,
            name,
            category: self.category,
            room_id: self.room_id,
            is_reachable: self.is_reachable,
            is_blocked: self.is_blocked,
            is_bridged: self.is_bridged,
            firmware_version: self.firmware_version,
            manufacturer: self.manufacturer,
            model: self.model,
            services,
        })
    }
}
