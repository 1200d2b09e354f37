//! Rig lifecycle events.

use bevy_ecs::prelude::*;

/// Disable a rig: cancel its sequences, restore every part to its rest pose
/// and return the click gate to its initial state.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deactivate {
    pub entity: Entity,
}

/// A rig's gate changed state.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct GateChanged {
    pub entity: Entity,
    pub state: crate::components::clickgate::GateState,
}
