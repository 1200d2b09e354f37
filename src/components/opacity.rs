use bevy_ecs::prelude::Component;

use super::tween::TweenLocks;

/// Visual alpha of a sprite or group, `0.0` transparent to `1.0` opaque.
///
/// Only entities carrying this component can be faded.
#[derive(Component, Clone, Debug, Copy, PartialEq)]
#[require(TweenLocks)]
pub struct Opacity {
    pub alpha: f32,
}

impl Opacity {
    pub fn new(alpha: f32) -> Self {
        Self { alpha }
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}
