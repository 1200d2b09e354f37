//! Clickable character rigs.
//!
//! A rig owner entity carries:
//! - [`Rig`]: named part slots, each a list of animatable entities
//! - [`ClickReaction`]: the [`Choreography`] describing what a click plays
//! - [`ClickGate`](super::clickgate::ClickGate) and a
//!   [`HitBox`](super::hitbox::HitBox) for the click pipeline
//!
//! Choreographies are pure: they look at the rig and its rest snapshots and
//! return [`SequenceSpec`]s. Playing, cancelling and restoring is done by the
//! systems in [`crate::systems::click`] and [`crate::systems::reststate`].

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::clickgate::{Cue, GateMode};
use super::reststate::RestState;
use super::sequence::{Action, SequenceSpec};
use crate::error::AnimError;

/// Named part slots of a rig.
#[derive(Component, Clone, Debug, Default)]
pub struct Rig {
    slots: FxHashMap<&'static str, SmallVec<[Entity; 2]>>,
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, slot: &'static str, entity: Entity) -> Self {
        self.slots.entry(slot).or_default().push(entity);
        self
    }

    pub fn with_parts(mut self, slot: &'static str, entities: impl IntoIterator<Item = Entity>) -> Self {
        self.slots.entry(slot).or_default().extend(entities);
        self
    }

    /// First entity of `slot`.
    pub fn part(&self, slot: &'static str) -> Result<Entity, AnimError> {
        self.parts(slot)
            .first()
            .copied()
            .ok_or(AnimError::MissingPart(slot))
    }

    /// All entities of `slot`, empty if unassigned.
    pub fn parts(&self, slot: &'static str) -> &[Entity] {
        self.slots.get(slot).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every entity referenced by any slot, without duplicates.
    pub fn all_parts(&self) -> Vec<Entity> {
        let mut all: Vec<Entity> = self.slots.values().flatten().copied().collect();
        all.sort();
        all.dedup();
        all
    }
}

/// What a choreography sees when building sequences.
pub struct RigView<'a> {
    pub owner: Entity,
    pub rig: &'a Rig,
    pub rests: &'a FxHashMap<Entity, RestState>,
}

impl RigView<'_> {
    pub fn rest(&self, entity: Entity) -> Result<&RestState, AnimError> {
        self.rests.get(&entity).ok_or(AnimError::NotCaptured(entity))
    }

    pub fn rest_position(&self, entity: Entity) -> Result<Vec3, AnimError> {
        self.rest(entity).map(RestState::position)
    }

    pub fn rest_scale(&self, entity: Entity) -> Result<Vec3, AnimError> {
        self.rest(entity).map(RestState::scale)
    }

    pub fn rest_rotation(&self, entity: Entity) -> Result<f32, AnimError> {
        self.rest(entity).map(RestState::rotation)
    }
}

/// Scripted reaction of one kind of rig.
pub trait Choreography: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn gate_mode(&self) -> GateMode;

    /// Pose applied once snapshots exist and again after every deactivation.
    fn arm(&self, _view: &RigView) -> Vec<Action> {
        Vec::new()
    }

    /// Sequence played for an accepted click.
    fn cue(&self, cue: Cue, view: &RigView, rng: &mut fastrand::Rng) -> Result<SequenceSpec, AnimError>;

    /// Infinite loop started when the cue sequence completes.
    fn idle(&self, _cue: Cue, _view: &RigView, _rng: &mut fastrand::Rng) -> Option<SequenceSpec> {
        None
    }
}

#[derive(Component)]
pub struct ClickReaction {
    pub choreography: Box<dyn Choreography>,
}

impl ClickReaction {
    pub fn new(choreography: impl Choreography) -> Self {
        Self {
            choreography: Box::new(choreography),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    #[test]
    fn test_slots_collect_parts() {
        let mut world = World::new();
        let body = world.spawn_empty().id();
        let left = world.spawn_empty().id();
        let right = world.spawn_empty().id();
        let rig = Rig::new()
            .with_part("body", body)
            .with_part("arm", left)
            .with_part("arm", right);
        assert_eq!(rig.part("body"), Ok(body));
        assert_eq!(rig.parts("arm"), &[left, right]);
        assert_eq!(rig.part("eyelid"), Err(AnimError::MissingPart("eyelid")));
        assert!(rig.parts("eyelid").is_empty());
        assert_eq!(rig.all_parts().len(), 3);
    }
}
