//! # ECS Error Types
//!
//! Failures and warnings raised by the entity/component core.
//!
//! Per-entity problems never unwind: destructive operations on a stale
//! handle become no-ops, queries become `None`, and the caller is told via
//! an [`EcsError`] return value or an [`EcsWarning`] delivered to the scene's
//! warning hook.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur in the ECS core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle was never issued, was already destroyed, or its slot has
    /// since been recycled.
    #[error("stale entity handle: {0}")]
    StaleEntity(Entity),

    /// Every entity index below the configured limit is in use.
    #[error("entity limit reached: {max} entities")]
    EntityLimitReached {
        /// The configured maximum number of entity slots.
        max: u32,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Recoverable misuse reported by a [`Scene`](crate::ecs::Scene).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsWarning {
    /// A stale handle was passed to a scene operation.
    #[error("{operation} ignored stale entity {entity}")]
    StaleEntity {
        /// The offending handle.
        entity: Entity,
        /// Name of the scene operation that rejected it.
        operation: &'static str,
    },

    /// A component was added to an entity that already had one of that type.
    /// The existing value is kept.
    #[error("entity {entity} already has a {component} component")]
    DuplicateComponent {
        /// The entity that was targeted.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EcsError::StaleEntity(Entity::new(3, 1));
        assert_eq!(err.to_string(), "stale entity handle: 3v1");

        let err = EcsError::EntityLimitReached { max: 16 };
        assert_eq!(err.to_string(), "entity limit reached: 16 entities");
    }

    #[test]
    fn test_warning_display() {
        let warning = EcsWarning::DuplicateComponent {
            entity: Entity::new(0, 2),
            component: "Position",
        };
        assert_eq!(warning.to_string(), "entity 0v2 already has a Position component");
    }
}
