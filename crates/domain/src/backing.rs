//! Live vs detached representation of mirrored objects.
//!
//! Every mirrored object is either backed by the home source (and addressed
//! through a [`SourceHandle`]) or a detached stand-in holding only local
//! state, used for previews and tests. Use-cases branch on [`Backing`] once
//! instead of falling back field by field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DetachedError;

/// Opaque token the home source uses to address one of its objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHandle(String);

impl SourceHandle {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the authoritative state of an object lives.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backing {
    /// Owned by the home source; mutations go through it.
    Live(SourceHandle),
    /// Local stand-in; mutations apply to the snapshot only.
    #[default]
    Detached,
}

impl Backing {
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    #[must_use]
    pub fn handle(&self) -> Option<&SourceHandle> {
        match self {
            Self::Live(handle) => Some(handle),
            Self::Detached => None,
        }
    }
}

/// Common surface of every mirrored object.
pub trait Mirrored {
    /// Human-readable kind used in errors and logs (e.g. `"Room"`).
    const KIND: &'static str;

    /// Identifier rendered as a string.
    fn id_string(&self) -> String;

    fn backing(&self) -> &Backing;

    fn name(&self) -> &str;

    /// Overwrite the local snapshot of the name.
    fn set_name(&mut self, name: String);

    /// Handle of a live object.
    ///
    /// # Errors
    ///
    /// Returns [`DetachedError`] when the object is detached.
    fn live_handle(&self) -> Result<&SourceHandle, DetachedError> {
        self.backing().handle().ok_or_else(|| DetachedError {
            entity: Self::KIND,
            id: self.id_string(),
        })
    }
}

/// Implement [`Mirrored`] plus the `id`/`name`/`backing` accessors for a
/// struct with `id`, `name` and `backing` fields.
macro_rules! impl_mirrored {
    ($ty:ty, $id:ty, $kind:literal) => {
        impl $ty {
            #[must_use]
            pub fn id(&self) -> $id {
                self.id
            }

            #[must_use]
            pub fn name(&self) -> &str {
                &self.name
            }

            #[must_use]
            pub fn backing(&self) -> &$crate::backing::Backing {
                &self.backing
            }

            /// Replace the backing (used by sources adopting detached objects).
            pub fn set_backing(&mut self, backing: $crate::backing::Backing) {
                self.backing = backing;
            }

            pub fn backing_mut(&mut self) -> &mut $crate::backing::Backing {
                &mut self.backing
            }
        }

        impl $crate::backing::Mirrored for $ty {
            const KIND: &'static str = $kind;

            fn id_string(&self) -> String {
                self.id.to_string()
            }

            fn backing(&self) -> &$crate::backing::Backing {
                &self.backing
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn set_name(&mut self, name: String) {
                self.name = name;
            }
        }
    };
}

pub(crate) use impl_mirrored;
