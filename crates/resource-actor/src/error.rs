//! # Store Errors
//!
//! Errors raised by the store itself, as opposed to the per-table errors entities return
//! from their hooks (those travel inside [`FrameworkError::EntityError`]).

/// Errors that can occur within the store.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unique key already taken: {0}")]
    UniqueViolation(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recover the concrete entity error carried by `EntityError`.
    ///
    /// Returns `Err(self)` unchanged when the variant is not `EntityError` or when the boxed
    /// error is of another type, so callers can fall back to their own mapping.
    pub fn downcast_entity<E>(self) -> Result<E, Self>
    where
        E: std::error::Error + 'static,
    {
        match self {
            FrameworkError::EntityError(inner) => inner
                .downcast::<E>()
                .map(|boxed| *boxed)
                .map_err(FrameworkError::EntityError),
            other => Err(other),
        }
    }
}
