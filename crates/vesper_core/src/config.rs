//! # Scene Configuration
//!
//! Sizing knobs for a [`Scene`](crate::Scene), loaded once at startup from
//! a TOML file.
//!
//! ```toml
//! entity_capacity = 65536
//! component_capacity = 4096
//! max_entities = 1000000
//! ```
//!
//! Every key is optional; missing keys fall back to [`SceneConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ecs::Entity;
use crate::error::{EcsError, EcsResult};

/// Sizing configuration for a scene and its stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Entity slots reserved up front by the registry.
    pub entity_capacity: usize,
    /// Dense slots reserved by each component store when it is created.
    pub component_capacity: usize,
    /// Upper bound on entity slots ever issued. Reaching it is fatal for
    /// `create_entity` and an error for `try_create_entity`.
    pub max_entities: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 1024,
            component_capacity: 256,
            max_entities: Entity::NULL_INDEX,
        }
    }
}

impl SceneConfig {
    /// Largest `entity_capacity` or `component_capacity` accepted. Larger
    /// reservations are refused up front instead of failing inside the
    /// allocator.
    pub const MAX_RESERVED_CAPACITY: usize = 1 << 24;

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the text is not valid TOML,
    /// contains unknown keys, or fails [`SceneConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the file cannot be read or
    /// its contents are rejected by [`SceneConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EcsError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `max_entities` is zero,
    /// `entity_capacity` is larger than `max_entities`, or either capacity
    /// exceeds [`SceneConfig::MAX_RESERVED_CAPACITY`].
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_entities == 0 {
            return Err(EcsError::InvalidConfig(
                "max_entities must be at least 1".to_string(),
            ));
        }
        for (key, value) in [
            ("entity_capacity", self.entity_capacity),
            ("component_capacity", self.component_capacity),
        ] {
            if value > Self::MAX_RESERVED_CAPACITY {
                return Err(EcsError::InvalidConfig(format!(
                    "{key} ({value}) exceeds the reservation limit ({})",
                    Self::MAX_RESERVED_CAPACITY
                )));
            }
        }
        if self.entity_capacity > self.max_entities as usize {
            return Err(EcsError::InvalidConfig(format!(
                "entity_capacity ({}) exceeds max_entities ({})",
                self.entity_capacity, self.max_entities
            )));
        }
        Ok(())
    }
}
