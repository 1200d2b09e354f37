use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Axis-aligned clickable region, relative to the owner's position.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct HitBox {
    pub size: Vec2,
    pub offset: Vec2,
}

impl HitBox {
    /// Region centered on the entity position.
    pub fn centered(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            offset: Vec2::new(-width * 0.5, -height * 0.5),
        }
    }

    /// Returns (min, max) of the region for a given entity position.
    /// Handles negative size by normalizing to proper min/max.
    pub fn aabb(&self, position: Vec2) -> (Vec2, Vec2) {
        let p0 = position + self.offset;
        let p1 = p0 + self.size;
        (p0.min(p1), p0.max(p1))
    }

    /// Point containment in world space, edges inclusive.
    pub fn contains_point(&self, position: Vec2, point: Vec2) -> bool {
        let (min, max) = self.aabb(position);
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}
