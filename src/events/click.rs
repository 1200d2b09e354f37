//! Pointer clicks on rig hit boxes.

use bevy_ecs::prelude::*;

/// Primary-button press that landed on the [`HitBox`](crate::components::hitbox::HitBox)
/// of an armed rig.
///
/// Triggered by [`click_detector`](crate::systems::click::click_detector) and
/// handled by [`click_gate_observer`](crate::systems::click::click_gate_observer).
/// Hosts may also trigger it directly to simulate a click.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// The rig owner that was clicked.
    pub entity: Entity,
}
