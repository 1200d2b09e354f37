//! Pointer input system.
//!
//! The host samples its pointer device and calls [`update_pointer_state`]
//! once per tick, before the schedule runs.
use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::resources::pointer::PointerState;

/// Store the pointer position and recompute the primary button edges.
pub fn update_pointer_state(world: &mut World, position: Vec2, down: bool) {
    let mut pointer = world.resource_mut::<PointerState>();
    pointer.position = position;
    pointer.primary.update(down);
}
