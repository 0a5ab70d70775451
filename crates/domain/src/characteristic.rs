//! Characteristic: a single observable/controllable attribute of a service.
//!
//! A characteristic carries the wire identifier of its kind, the capabilities
//! the source advertises for it, and the last value the source reported.

mod kind;
mod value;

pub use kind::CharacteristicCategory;
pub use value::CharacteristicValue;

use serde::{Deserialize, Serialize};

/// Capabilities advertised by the source for a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct CharacteristicProperties {
    pub readable: bool,
    pub writable: bool,
    pub supports_event_notification: bool,
    pub hidden: bool,
}

impl CharacteristicProperties {
    /// Readable, writable and notifying.
    pub const CONTROL: Self = Self {
        readable: true,
        writable: true,
        supports_event_notification: true,
        hidden: false,
    };

    /// Readable and notifying (sensor readings).
    pub const SENSOR: Self = Self {
        readable: true,
        writable: false,
        supports_event_notification: true,
        hidden: false,
    };

    /// Readable only.
    pub const READ_ONLY: Self = Self {
        readable: true,
        writable: false,
        supports_event_notification: false,
        hidden: false,
    };
}

/// A characteristic hosted by a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    characteristic_type: String,
    properties: CharacteristicProperties,
    value: Option<CharacteristicValue>,
}

impl Characteristic {
    /// A characteristic of a known category.
    #[must_use]
    pub fn new(category: CharacteristicCategory, properties: CharacteristicProperties) -> Self {
        Self::with_type(category.wire_id(), properties)
    }

    /// A characteristic identified only by its wire type (possibly unknown).
    #[must_use]
    pub fn with_type(
        characteristic_type: impl Into<String>,
        properties: CharacteristicProperties,
    ) -> Self {
        Self {
            characteristic_type: characteristic_type.into(),
            properties,
            value: None,
        }
    }

    /// Set the initial cached value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<CharacteristicValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Raw wire identifier of the characteristic type.
    #[must_use]
    pub fn characteristic_type(&self) -> &str {
        &self.characteristic_type
    }

    /// Known category of this characteristic, if any.
    #[must_use]
    pub fn category(&self) -> Option<CharacteristicCategory> {
        CharacteristicCategory::from_wire_id(&self.characteristic_type)
    }

    #[must_use]
    pub fn is(&self, category: CharacteristicCategory) -> bool {
        self.characteristic_type
            .eq_ignore_ascii_case(category.wire_id())
    }

    #[must_use]
    pub fn properties(&self) -> CharacteristicProperties {
        self.properties
    }

    #[must_use]
    pub fn supports_event_notification(&self) -> bool {
        self.properties.supports_event_notification
    }

    /// Last value reported by the source.
    #[must_use]
    pub fn value(&self) -> Option<&CharacteristicValue> {
        self.value.as_ref()
    }

    /// Replace the cached value.
    pub fn set_value(&mut self, value: Option<CharacteristicValue>) {
        self.value = value;
    }
}
