use bevy_ecs::prelude::Component;
use glam::Vec3;

/// Pose of an entity captured once before any animation touches it.
///
/// Fields are private and there is no mutator: after capture the snapshot
/// can only be read.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct RestState {
    position: Vec3,
    rotation: f32,
    scale: Vec3,
    opacity: Option<f32>,
}

impl RestState {
    pub(crate) fn capture(position: Vec3, rotation: f32, scale: Vec3, opacity: Option<f32>) -> Self {
        Self {
            position,
            rotation,
            scale,
            opacity,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// `None` when the entity cannot be faded.
    pub fn opacity(&self) -> Option<f32> {
        self.opacity
    }
}
