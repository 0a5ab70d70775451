//! Characteristic service: reading and writing characteristic values.

use std::sync::Arc;

use hkmirror_domain::characteristic::{CharacteristicCategory, CharacteristicValue};
use hkmirror_domain::error::{MirrorError, NotFoundError, ValidationError};
use hkmirror_domain::service::Service;

use crate::ports::HomeSource;

pub struct CharacteristicService<S> {
    source: Arc<S>,
}

fn missing(service: &Service, category: CharacteristicCategory) -> MirrorError {
    NotFoundError {
        entity: "Characteristic",
        id: format!("{category} of service {}", service.id()),
    }
    .into()
}

impl<S: HomeSource> CharacteristicService<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Fetch the current value of `category` on `service`.
    ///
    /// Live services ask the source and refresh the cached value; detached
    /// services return the cached value.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if the service has no such
    /// characteristic, or the source's error.
    #[tracing::instrument(skip(self, service), fields(service = %service.id()))]
    pub async fn read(
        &self,
        service: &mut Service,
        category: CharacteristicCategory,
    ) -> Result<Option<CharacteristicValue>, MirrorError> {
        if service.characteristic(category).is_none() {
            return Err(missing(service, category));
        }
        let Some(handle) = service.backing().handle().cloned() else {
            return Ok(service.value(category).cloned());
        };
        let value = self.source.read_value(&handle, category).await?;
        service.set_value(category, value.clone());
        Ok(value)
    }

    /// Write `value` to `category` on `service`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if the service has no such
    /// characteristic, [`MirrorError::Validation`] if it is read-only, or the
    /// source's error (the cached value is then left untouched).
    #[tracing::instrument(skip(self, service), fields(service = %service.id()))]
    pub async fn write(
        &self,
        service: &mut Service,
        category: CharacteristicCategory,
        value: CharacteristicValue,
    ) -> Result<(), MirrorError> {
        let Some(characteristic) = service.characteristic(category) else {
            return Err(missing(service, category));
        };
        if !characteristic.properties().writable {
            return Err(ValidationError::NotWritable(category.to_string()).into());
        }
        if let Some(handle) = service.backing().handle().cloned() {
            self.source
                .write_value(&handle, category, value.clone())
                .await?;
        }
        service.set_value(category, Some(value));
        Ok(())
    }
}
