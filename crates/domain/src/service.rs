//! Service: a named capability bundle hosted by an accessory.
//!
//! A service hosts characteristics (e.g. a lightbulb service hosts power
//! state and brightness). Its [`ServiceId`] is the identity listeners are
//! keyed on.

use serde::{Deserialize, Serialize};

use crate::backing::{Backing, impl_mirrored};
use crate::category::wire_enum;
use crate::characteristic::{
    Characteristic, CharacteristicCategory, CharacteristicProperties, CharacteristicValue,
};
use crate::error::{MirrorError, ValidationError};
use crate::id::{AccessoryId, ServiceId};
use crate::naming::generated_name;

wire_enum! {
    /// The type of a service, e.g. `Lightbulb`.
    pub enum ServiceCategory {
        Switch = ("00000049-0000-1000-8000-0026BB765291", "Switch"),
        Thermostat = ("0000004A-0000-1000-8000-0026BB765291", "Thermostat"),
        Outlet = ("00000047-0000-1000-8000-0026BB765291", "Outlet"),
        LockManagement = ("00000044-0000-1000-8000-0026BB765291", "Lock Management"),
        AirQualitySensor = ("0000008D-0000-1000-8000-0026BB765291", "Air Quality Sensor"),
        CarbonDioxideSensor = ("00000097-0000-1000-8000-0026BB765291", "Carbon Dioxide Sensor"),
        CarbonMonoxideSensor = ("0000007F-0000-1000-8000-0026BB765291", "Carbon Monoxide Sensor"),
        ContactSensor = ("00000080-0000-1000-8000-0026BB765291", "Contact Sensor"),
        Door = ("00000081-0000-1000-8000-0026BB765291", "Door"),
        HumiditySensor = ("00000082-0000-1000-8000-0026BB765291", "Humidity Sensor"),
        LeakSensor = ("00000083-0000-1000-8000-0026BB765291", "Leak Sensor"),
        LightSensor = ("00000084-0000-1000-8000-0026BB765291", "Light Sensor"),
        MotionSensor = ("00000085-0000-1000-8000-0026BB765291", "Motion Sensor"),
        OccupancySensor = ("00000086-0000-1000-8000-0026BB765291", "Occupancy Sensor"),
        SecuritySystem = ("0000007E-0000-1000-8000-0026BB765291", "Security System"),
        StatefulProgrammableSwitch = ("00000088-0000-1000-8000-0026BB765291", "Stateful Programmable Switch"),
        StatelessProgrammableSwitch = ("00000089-0000-1000-8000-0026BB765291", "Stateless Programmable Switch"),
        SmokeSensor = ("00000087-0000-1000-8000-0026BB765291", "Smoke Sensor"),
        TemperatureSensor = ("0000008A-0000-1000-8000-0026BB765291", "Temperature Sensor"),
        Window = ("0000008B-0000-1000-8000-0026BB765291", "Window"),
        WindowCovering = ("0000008C-0000-1000-8000-0026BB765291", "Window Covering"),
        CameraRtpStreamManagement = ("00000110-0000-1000-8000-0026BB765291", "Camera RTP Stream Management"),
        CameraControl = ("00000111-0000-1000-8000-0026BB765291", "Camera Control"),
        Microphone = ("00000112-0000-1000-8000-0026BB765291", "Microphone"),
        Speaker = ("00000113-0000-1000-8000-0026BB765291", "Speaker"),
        AirPurifier = ("000000BB-0000-1000-8000-0026BB765291", "Air Purifier"),
        FilterMaintenance = ("000000BA-0000-1000-8000-0026BB765291", "Filter Maintenance"),
        Slats = ("000000B9-0000-1000-8000-0026BB765291", "Slats"),
        Label = ("000000CC-0000-1000-8000-0026BB765291", "Label"),
        IrrigationSystem = ("000000CF-0000-1000-8000-0026BB765291", "Irrigation System"),
        Valve = ("000000D0-0000-1000-8000-0026BB765291", "Valve"),
        Faucet = ("000000D7-0000-1000-8000-0026BB765291", "Faucet"),
        AccessoryInformation = ("0000003E-0000-1000-8000-0026BB765291", "Accessory Information"),
        Fan = ("00000040-0000-1000-8000-0026BB765291", "Fan"),
        GarageDoorOpener = ("00000041-0000-1000-8000-0026BB765291", "Garage Door Opener"),
        Lightbulb = ("00000043-0000-1000-8000-0026BB765291", "Lightbulb"),
        LockMechanism = ("00000045-0000-1000-8000-0026BB765291", "Lock Mechanism"),
        Battery = ("00000096-0000-1000-8000-0026BB765291", "Battery"),
        VentilationFan = ("000000B7-0000-1000-8000-0026BB765291", "Ventilation Fan"),
        HeaterCooler = ("000000BC-0000-1000-8000-0026BB765291", "Heater-Cooler"),
        HumidifierDehumidifier = ("000000BD-0000-1000-8000-0026BB765291", "Humidifier-Dehumidifier"),
        Doorbell = ("00000121-0000-1000-8000-0026BB765291", "Doorbell"),
        AccessoryRuntimeInformation = ("00000239-0000-1000-8000-0026BB765291", "Accessory Runtime Information"),
        ThreadTransport = ("00000701-0000-1000-8000-0026BB765291", "Thread Transport"),
        Eve = ("E863F007-079E-48FF-8F27-9C2605A29F52", "Eve"),
    }
}

/// A service and a snapshot of its characteristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    id: ServiceId,
    backing: Backing,
    name: String,
    category: ServiceCategory,
    accessory_id: Option<AccessoryId>,
    is_primary: bool,
    characteristics: Vec<Characteristic>,
}

impl_mirrored!(Service, ServiceId, "Service");

impl Service {
    /// Create a builder for constructing a [`Service`].
    #[must_use]
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::default()
    }

    #[must_use]
    pub fn category(&self) -> ServiceCategory {
        self.category
    }

    /// Accessory providing this service, when known.
    #[must_use]
    pub fn accessory_id(&self) -> Option<AccessoryId> {
        self.accessory_id
    }

    pub fn set_accessory_id(&mut self, accessory_id: AccessoryId) {
        self.accessory_id = Some(accessory_id);
    }

    /// Whether this is the primary service of its accessory.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    #[must_use]
    pub fn characteristics(&self) -> &[Characteristic] {
        &self.characteristics
    }

    /// First characteristic of the given category.
    #[must_use]
    pub fn characteristic(&self, category: CharacteristicCategory) -> Option<&Characteristic> {
        self.characteristics.iter().find(|c| c.is(category))
    }

    pub fn characteristic_mut(
        &mut self,
        category: CharacteristicCategory,
    ) -> Option<&mut Characteristic> {
        self.characteristics.iter_mut().find(|c| c.is(category))
    }

    /// Cached value of the given characteristic.
    #[must_use]
    pub fn value(&self, category: CharacteristicCategory) -> Option<&CharacteristicValue> {
        self.characteristic(category).and_then(Characteristic::value)
    }

    /// Replace the cached value; returns `false` when the service has no such
    /// characteristic.
    pub fn set_value(
        &mut self,
        category: CharacteristicCategory,
        value: Option<CharacteristicValue>,
    ) -> bool {
        match self.characteristic_mut(category) {
            Some(characteristic) => {
                characteristic.set_value(value);
                true
            }
            None => false,
        }
    }
}

/// Step-by-step builder for [`Service`].
#[derive(Debug, Default)]
pub struct ServiceBuilder {
    id: Option<ServiceId>,
    backing: Backing,
    name: Option<String>,
    category: Option<ServiceCategory>,
    accessory_id: Option<AccessoryId>,
    is_primary: Option<bool>,
    characteristics: Vec<Characteristic>,
}

impl ServiceBuilder {
    #[must_use]
    pub fn id(mut self, id: ServiceId) -> Self {
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
    pub fn category(mut self, category: ServiceCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn accessory_id(mut self, accessory_id: AccessoryId) -> Self {
        self.accessory_id = Some(accessory_id);
        self
    }

    #[must_use]
    pub fn primary(mut self, is_primary: bool) -> Self {
        self.is_primary = Some(is_primary);
        self
    }

    #[must_use]
    pub fn characteristic(mut self, characteristic: Characteristic) -> Self {
        self.characteristics.push(characteristic);
        self
    }

    /// Shorthand for a characteristic of `category` with an initial value.
    #[must_use]
    pub fn with_value(
        self,
        category: CharacteristicCategory,
        properties: CharacteristicProperties,
        value: impl Into<CharacteristicValue>,
    ) -> Self {
        self.characteristic(Characteristic::new(category, properties).with_value(value))
    }

    /// Consume the builder, validate, and return a [`Service`].
    ///
    /// A missing name is generated from the category description.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] if `category` is missing or the
    /// provided name is empty.
    pub fn build(self) -> Result<Service, MirrorError> {
        let category = self
            .category
            .ok_or(ValidationError::MissingField("category"))?;
        let name = match self.name {
            Some(name) if name.is_empty() => return Err(ValidationError::EmptyName.into()),
            Some(name) => name,
            None => generated_name(category.description()),
        };
        Ok(Service {
            id: self.id.unwrap_or_default(),
            backing: self.backing,
            name,
            category,
            accessory_id: self.accessory_id,
            is_primary: self.is_primary.unwrap_or(true),
            characteristics: self.characteristics,
        })
    }
}
