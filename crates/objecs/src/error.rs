//! # Store Error Types
//!
//! All errors that can occur when mutating a store.

use thiserror::Error;

use crate::ecs::{ComponentId, EntityId, ViewId};

/// Errors that can occur in the entity store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The entity was never created by this store or has been deleted.
    #[error("unknown entity: {0:?}")]
    UnknownEntity(EntityId),

    /// The view was never registered on this store or has been disposed.
    #[error("unknown view: {0:?}")]
    UnknownView(ViewId),

    /// The component ID was not issued by this store.
    #[error("unknown component: {0:?}")]
    UnknownComponent(ComponentId),

    /// Registering another component name would overflow the bitmask.
    #[error("cannot register component {name:?}: limit of {limit} components reached")]
    ComponentLimit {
        /// The name that could not be registered.
        name: String,
        /// The maximum number of components per store.
        limit: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::UnknownEntity(EntityId::new(3, 1));
        assert!(err.to_string().starts_with("unknown entity"));

        let err = StoreError::ComponentLimit {
            name: "z".to_owned(),
            limit: 64,
        };
        assert_eq!(
            err.to_string(),
            "cannot register component \"z\": limit of 64 components reached"
        );
    }
}
