//! Service group: user-defined collection of services controlled together.

use serde::{Deserialize, Serialize};

use crate::backing::{Backing, impl_mirrored};
use crate::error::{MirrorError, ValidationError};
use crate::id::{ServiceGroupId, ServiceId};
use crate::naming::generated_name;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceGroup {
    id: ServiceGroupId,
    backing: Backing,
    name: String,
    service_ids: Vec<ServiceId>,
}

impl_mirrored!(ServiceGroup, ServiceGroupId, "ServiceGroup");

impl ServiceGroup {
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] if the provided name is empty.
    pub fn new(name: Option<String>, service_ids: Vec<ServiceId>) -> Result<Self, MirrorError> {
        let name = match name {
            Some(name) if name.is_empty() => return Err(ValidationError::EmptyName.into()),
            Some(name) => name,
            None => generated_name("Group"),
        };
        Ok(Self {
            id: ServiceGroupId::new(),
            backing: Backing::Detached,
            name,
            service_ids,
        })
    }

    #[must_use]
    pub fn service_ids(&self) -> &[ServiceId] {
        &self.service_ids
    }

    /// Groups whose name contains `query`, ignoring case.
    #[must_use]
    pub fn find<'a>(query: &str, groups: &'a [ServiceGroup]) -> Vec<&'a ServiceGroup> {
        let query = query.to_lowercase();
        groups
            .iter()
            .filter(|g| query.is_empty() || g.name.to_lowercase().contains(&query))
            .collect()
    }
}
