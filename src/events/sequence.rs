//! Sequence lifecycle events.

use bevy_ecs::prelude::*;

/// A sequence finished its last iteration.
///
/// Never triggered for infinitely looping sequences or cancelled ones.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SequenceCompleted {
    /// The player entity, already scheduled for despawn.
    pub sequence: Entity,
    pub owner: Entity,
    /// Signal set with [`SequenceSpec::on_complete`](crate::components::sequence::SequenceSpec::on_complete).
    pub signal: Option<String>,
}

/// Named signal fired by an [`Action::Emit`](crate::components::sequence::Action::Emit) step.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SequenceSignal {
    /// `None` when the action was applied outside of a timeline.
    pub sequence: Option<Entity>,
    pub owner: Entity,
    pub signal: String,
}
