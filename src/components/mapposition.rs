use bevy_ecs::prelude::Component;
use glam::Vec3;

use super::tween::TweenLocks;

/// Local position of an animatable entity. `z` orders overlapping hit boxes.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
#[require(TweenLocks)]
pub struct MapPosition {
    pub pos: Vec3,
}

impl MapPosition {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, z),
        }
    }
}
