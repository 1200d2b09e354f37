use bevy_ecs::prelude::Component;
use glam::Vec3;

use super::tween::TweenLocks;

/// Local scale per axis. The rest pose of every authored part is `ONE`.
#[derive(Component, Clone, Debug, Copy, PartialEq)]
#[require(TweenLocks)]
pub struct Scale {
    pub scale: Vec3,
}
impl Default for Scale {
    fn default() -> Self {
        Self { scale: Vec3::ONE }
    }
}
