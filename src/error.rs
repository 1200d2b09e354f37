//! Error types.
//!
//! None of these are fatal. Animation errors are logged and the offending
//! sub-animation is skipped; configuration errors fall back to defaults.

use bevy_ecs::prelude::Entity;
use thiserror::Error;

use crate::components::tween::Property;

/// Failures while resolving the collaborators of an animation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimError {
    /// The target entity does not exist or carries none of the animatable components.
    #[error("entity {0:?} is not an animatable entity")]
    MissingReference(Entity),
    /// The target exists but lacks the component backing `property`
    /// (e.g. fading a sprite that has no [`Opacity`](crate::components::opacity::Opacity)).
    #[error("entity {entity:?} cannot animate {property:?}: missing {capability} component")]
    MissingCapability {
        entity: Entity,
        property: Property,
        capability: &'static str,
    },
    /// A rig slot the choreography needs was never assigned.
    #[error("rig slot '{0}' is not assigned")]
    MissingPart(&'static str),
    /// Restore was requested before a rest snapshot existed.
    #[error("entity {0:?} has no captured rest state")]
    NotCaptured(Entity),
    /// A second snapshot was requested for the same entity.
    #[error("entity {0:?} already has a rest state")]
    AlreadyCaptured(Entity),
}

/// Failures while loading tunables or scene files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file {path}: {reason}")]
    Load { path: String, reason: String },
    #[error("invalid value for [{section}] {key}: {value:?}")]
    Invalid {
        section: String,
        key: String,
        value: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
