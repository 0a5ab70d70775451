//! Action set (scene): a named batch of writes executed together.

use serde::{Deserialize, Serialize};

use crate::backing::{Backing, impl_mirrored};
use crate::category::wire_enum;
use crate::error::{MirrorError, ValidationError};
use crate::id::ActionSetId;
use crate::naming::generated_name;

wire_enum! {
    /// Built-in purpose of an action set.
    #[derive(Default)]
    pub enum ActionSetKind {
        #[default]
        UserDefined = ("HMActionSetTypeUserDefined", "User defined"),
        WakeUp = ("HMActionSetTypeWakeUp", "Wake up"),
        Departure = ("HMActionSetTypeDeparture", "Departure"),
        Arrival = ("HMActionSetTypeArrival", "Arrival"),
        Sleep = ("HMActionSetTypeSleep", "Sleep"),
    }
}

impl ActionSetKind {
    /// Resolve a wire identifier; unknown identifiers are user defined.
    #[must_use]
    pub fn from_wire_id_or_default(wire_id: &str) -> Self {
        Self::from_wire_id(wire_id).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSet {
    id: ActionSetId,
    backing: Backing,
    name: String,
    kind: ActionSetKind,
    action_count: usize,
}

impl_mirrored!(ActionSet, ActionSetId, "ActionSet");

impl ActionSet {
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] if the provided name is empty.
    pub fn new(
        name: Option<String>,
        kind: ActionSetKind,
        action_count: usize,
    ) -> Result<Self, MirrorError> {
        let name = match name {
            Some(name) if name.is_empty() => return Err(ValidationError::EmptyName.into()),
            Some(name) => name,
            None => generated_name("Action set"),
        };
        Ok(Self {
            id: ActionSetId::new(),
            backing: Backing::Detached,
            name,
            kind,
            action_count,
        })
    }

    #[must_use]
    pub fn with_backing(mut self, backing: Backing) -> Self {
        self.backing = backing;
        self
    }

    #[must_use]
    pub fn kind(&self) -> ActionSetKind {
        self.kind
    }

    /// Number of actions the scene performs.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.action_count
    }
}
