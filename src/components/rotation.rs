use bevy_ecs::prelude::Component;

use super::tween::TweenLocks;

/// Z-axis angle in degrees.
#[derive(Component, Clone, Debug, Copy, Default, PartialEq)]
#[require(TweenLocks)]
pub struct Rotation {
    pub degrees: f32,
}
