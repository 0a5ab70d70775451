//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`MirrorError`]
//! via `#[from]`. Source adapters box their native errors into
//! [`MirrorError::Source`].

/// Top-level error returned by ports and use-cases.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("operation requires a live object")]
    Detached(#[from] DetachedError),

    #[error("home source error")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MirrorError {
    /// Wrap an arbitrary adapter error.
    pub fn from_source(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Source(Box::new(err))
    }
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("characteristic {0} is not writable")]
    NotWritable(String),
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// An operation needs the home source but the object is a local stand-in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} is detached from the home source")]
pub struct DetachedError {
    pub entity: &'static str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_with_from() {
        let err: MirrorError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            MirrorError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Room",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Room abc not found");
    }

    #[test]
    fn should_display_detached_error() {
        let err = DetachedError {
            entity: "Home",
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "Home 42 is detached from the home source");
    }

    #[test]
    fn should_keep_boxed_source_error() {
        let io = std::io::Error::other("radio off");
        let err = MirrorError::from_source(io);
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "radio off");
    }
}
