//! Trigger: fires one or more action sets on an event or schedule.

use serde::{Deserialize, Serialize};

use crate::backing::{Backing, impl_mirrored};
use crate::error::{MirrorError, ValidationError};
use crate::id::{ActionSetId, TriggerId};
use crate::time::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    id: TriggerId,
    backing: Backing,
    name: String,
    is_enabled: bool,
    last_fire_date: Option<Timestamp>,
    action_set_ids: Vec<ActionSetId>,
}

impl_mirrored!(Trigger, TriggerId, "Trigger");

impl Trigger {
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] if `name` is empty.
    pub fn new(
        name: impl Into<String>,
        action_set_ids: Vec<ActionSetId>,
    ) -> Result<Self, MirrorError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(Self {
            id: TriggerId::new(),
            backing: Backing::Detached,
            name,
            is_enabled: true,
            last_fire_date: None,
            action_set_ids,
        })
    }

    #[must_use]
    pub fn with_backing(mut self, backing: Backing) -> Self {
        self.backing = backing;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    #[must_use]
    pub fn last_fire_date(&self) -> Option<Timestamp> {
        self.last_fire_date
    }

    pub fn record_fire(&mut self, at: Timestamp) {
        self.last_fire_date = Some(at);
    }

    #[must_use]
    pub fn action_set_ids(&self) -> &[ActionSetId] {
        &self.action_set_ids
    }
}
