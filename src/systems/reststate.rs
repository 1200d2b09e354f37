//! Rest-pose capture, rig arming and deactivation.
//!
//! - [`capture_rest_states`] snapshots every animatable entity the first tick
//!   it exists, before any tween can touch it
//! - [`arm_rigs`] applies a rig's pre-click pose once all its parts have been
//!   captured and marks it [`Armed`]
//! - [`deactivate_observer`] cancels everything a rig plays, restores its
//!   parts and re-arms it

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::clickgate::ClickGate;
use crate::components::mapposition::MapPosition;
use crate::components::opacity::Opacity;
use crate::components::reststate::RestState;
use crate::components::rig::{ClickReaction, Rig, RigView};
use crate::components::rotation::Rotation;
use crate::components::scale::Scale;
use crate::components::tween::TweenLocks;
use crate::components::visibility::Armed;
use crate::error::AnimError;
use crate::events::rig::{Deactivate, GateChanged};
use crate::systems::tween::Tweens;

fn snapshot(
    pos: Option<&MapPosition>,
    rot: Option<&Rotation>,
    scale: Option<&Scale>,
    opacity: Option<&Opacity>,
) -> RestState {
    RestState::capture(
        pos.map(|p| p.pos).unwrap_or_default(),
        rot.map(|r| r.degrees).unwrap_or_default(),
        scale.map(|s| s.scale).unwrap_or(glam::Vec3::ONE),
        opacity.map(|o| o.alpha),
    )
}

/// Capture the rest snapshot of one entity right now.
///
/// Fails if the entity already has one or carries no animatable component.
pub fn capture_rest_state(world: &mut World, entity: Entity) -> Result<RestState, AnimError> {
    let Ok(e) = world.get_entity(entity) else {
        return Err(AnimError::MissingReference(entity));
    };
    if e.contains::<RestState>() {
        warn!("rest state of {:?} is already captured", entity);
        return Err(AnimError::AlreadyCaptured(entity));
    }
    if !e.contains::<TweenLocks>() {
        return Err(AnimError::MissingReference(entity));
    }
    let rest = snapshot(
        e.get::<MapPosition>(),
        e.get::<Rotation>(),
        e.get::<Scale>(),
        e.get::<Opacity>(),
    );
    world.entity_mut(entity).insert(rest);
    Ok(rest)
}

type Uncaptured<'a> = (
    Entity,
    Option<&'a MapPosition>,
    Option<&'a Rotation>,
    Option<&'a Scale>,
    Option<&'a Opacity>,
);

/// Snapshot every animatable entity that has no [`RestState`] yet.
pub fn capture_rest_states(
    mut commands: Commands,
    query: Query<Uncaptured<'static>, (With<TweenLocks>, Without<RestState>)>,
) {
    for (entity, pos, rot, scale, opacity) in query.iter() {
        commands.entity(entity).insert(snapshot(pos, rot, scale, opacity));
    }
}

/// Apply the choreography's arm pose. Failures are logged per action.
fn apply_arm_pose(owner: Entity, rig: &Rig, reaction: &ClickReaction, tweens: &mut Tweens) {
    let rests = tweens.rest_map(owner, rig);
    let view = RigView {
        owner,
        rig,
        rests: &rests,
    };
    for action in reaction.choreography.arm(&view) {
        if let Err(err) = tweens.apply(owner, action) {
            warn!("{} rig {:?}: arm pose: {}", reaction.choreography.name(), owner, err);
        }
    }
}

/// Arm rigs whose animatable parts all have rest snapshots.
pub fn arm_rigs(
    mut commands: Commands,
    rigs: Query<(Entity, &Rig, &ClickReaction), Without<Armed>>,
    pending: Query<(), (With<TweenLocks>, Without<RestState>)>,
    mut tweens: Tweens,
) {
    for (owner, rig, reaction) in rigs.iter() {
        if pending.contains(owner) || rig.all_parts().into_iter().any(|p| pending.contains(p)) {
            continue;
        }
        apply_arm_pose(owner, rig, reaction, &mut tweens);
        commands.entity(owner).insert(Armed);
        debug!("{} rig {:?} armed", reaction.choreography.name(), owner);
    }
}

/// Cancel, restore and re-arm a rig. Safe to trigger in any gate state.
pub fn deactivate_observer(
    trigger: On<Deactivate>,
    mut rigs: Query<(&Rig, &ClickReaction, &mut ClickGate)>,
    mut tweens: Tweens,
    mut commands: Commands,
) {
    let owner = trigger.event().entity;
    let Ok((rig, reaction, mut gate)) = rigs.get_mut(owner) else {
        warn!("deactivate: {:?} is not a rig", owner);
        return;
    };
    let cancelled = tweens.cancel_owned_by(owner);
    for entity in std::iter::once(owner).chain(rig.all_parts()) {
        match tweens.restore(entity) {
            Ok(()) => {}
            // Parts without animatable components have nothing to restore.
            Err(AnimError::NotCaptured(_)) => {}
            Err(err) => warn!("deactivate {:?}: {}", owner, err),
        }
    }
    gate.reset();
    apply_arm_pose(owner, rig, reaction, &mut tweens);
    debug!(
        "{} rig {:?} deactivated, {} sequence(s) cancelled",
        reaction.choreography.name(),
        owner,
        cancelled
    );
    commands.trigger(GateChanged {
        entity: owner,
        state: gate.state,
    });
}
