//! Mirror service: operations shared by every mirrored object.

use std::sync::Arc;

use hkmirror_domain::backing::Mirrored;
use hkmirror_domain::error::{MirrorError, ValidationError};

use crate::ports::HomeSource;

pub struct MirrorService<S> {
    source: Arc<S>,
}

impl<S: HomeSource> MirrorService<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Rename any mirrored object.
    ///
    /// Live objects are renamed through the source first; the local snapshot
    /// is updated once the source accepted the change. Detached objects are
    /// renamed in place.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] for an empty name, or the source's
    /// error (in which case the snapshot keeps its old name).
    #[tracing::instrument(skip(self, entity), fields(kind = E::KIND, id = %entity.id_string()))]
    pub async fn rename<E>(&self, entity: &mut E, name: &str) -> Result<(), MirrorError>
    where
        E: Mirrored + Send,
    {
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if let Some(handle) = entity.backing().handle().cloned() {
            self.source.rename(&handle, name).await?;
        }
        entity.set_name(name.to_string());
        Ok(())
    }
}
