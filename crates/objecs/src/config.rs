//! # Store Configuration
//!
//! Sizing hints for a [`Store`](crate::Store), loaded once at startup from
//! TOML:
//!
//! ```toml
//! initial_capacity = 4096
//! view_capacity = 32
//! ```
//!
//! Missing keys fall back to [`StoreConfig::default`].

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Default number of entity slots reserved up front.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Default number of view registry slots reserved up front.
pub const DEFAULT_VIEW_CAPACITY: usize = 16;

/// Sizing configuration for a store.
///
/// Capacities are reservations, not limits: the store grows past them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Entity slots and component rows reserved at construction.
    pub initial_capacity: usize,
    /// View registry slots reserved at construction.
    pub view_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            view_capacity: DEFAULT_VIEW_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if the document does not parse
    /// or fails [`StoreConfig::validate`].
    pub fn from_toml_str(source: &str) -> StoreResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the store cannot honour.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `initial_capacity` is zero or
    /// exceeds the 32-bit slot index space.
    pub fn validate(&self) -> StoreResult<()> {
        if self.initial_capacity == 0 {
            return Err(StoreError::InvalidConfig(
                "initial_capacity must be greater than zero".to_owned(),
            ));
        }
        if self.initial_capacity > u32::MAX as usize {
            return Err(StoreError::InvalidConfig(format!(
                "initial_capacity {} exceeds u32::MAX",
                self.initial_capacity
            )));
        }
        Ok(())
    }
}
