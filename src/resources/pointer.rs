//! Per-tick pointer input resource.
//!
//! The host feeds the pointer position and primary button state once per
//! tick through [`update_pointer_state`](crate::systems::input::update_pointer_state).
//! Systems read the debounced edges from [`PointerState`].
use bevy_ecs::prelude::*;
use glam::Vec2;

/// Boolean button state with edge flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolState {
    /// Whether the button is currently held.
    pub active: bool,
    /// Whether the button went down this tick.
    pub just_pressed: bool,
    /// Whether the button went up this tick.
    pub just_released: bool,
}

impl BoolState {
    /// Feed the raw state for this tick and recompute the edges.
    pub fn update(&mut self, down: bool) {
        self.just_pressed = down && !self.active;
        self.just_released = !down && self.active;
        self.active = down;
    }
}

#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PointerState {
    /// Pointer position in world units.
    pub position: Vec2,
    pub primary: BoolState,
}
