//! Click pipeline.
//!
//! [`click_detector`] turns a pointer press into a [`ClickEvent`] on the
//! front-most armed rig under the pointer. [`click_gate_observer`] asks the
//! rig's [`ClickGate`] whether the click is accepted and plays the cue
//! sequence. [`settle_gate_observer`] closes the gate transition when that
//! sequence completes and starts the idle loop.

use bevy_ecs::prelude::*;
use log::{debug, info, warn};

use crate::components::clickgate::{ClickGate, GateState};
use crate::components::hitbox::HitBox;
use crate::components::mapposition::MapPosition;
use crate::components::rig::{ClickReaction, Rig, RigView};
use crate::components::visibility::{Armed, Hidden};
use crate::events::click::ClickEvent;
use crate::events::rig::GateChanged;
use crate::events::sequence::SequenceCompleted;
use crate::resources::pointer::PointerState;
use crate::resources::rng::AnimRng;
use crate::systems::tween::Tweens;

/// Hit-test the pointer against armed, visible rigs. Smaller `z` is in front.
pub fn click_detector(
    pointer: Res<PointerState>,
    rigs: Query<(Entity, &MapPosition, &HitBox), (With<ClickGate>, With<Armed>, Without<Hidden>)>,
    mut commands: Commands,
) {
    if !pointer.primary.just_pressed {
        return;
    }
    let hit = rigs
        .iter()
        .filter(|(_, pos, hitbox)| hitbox.contains_point(pos.pos.truncate(), pointer.position))
        .min_by(|a, b| a.1.pos.z.total_cmp(&b.1.pos.z));
    if let Some((entity, ..)) = hit {
        commands.trigger(ClickEvent { entity });
    }
}

pub fn click_gate_observer(
    trigger: On<ClickEvent>,
    mut rigs: Query<(&Rig, &ClickReaction, &mut ClickGate), With<Armed>>,
    mut tweens: Tweens,
    mut rng: ResMut<AnimRng>,
    mut commands: Commands,
) {
    let owner = trigger.event().entity;
    let Ok((rig, reaction, mut gate)) = rigs.get_mut(owner) else {
        debug!("click on {:?} ignored: not an armed rig", owner);
        return;
    };
    let name = reaction.choreography.name();
    let Some(cue) = gate.accept() else {
        debug!("{} rig {:?}: click ignored in {:?}", name, owner, gate.state);
        return;
    };
    let rests = tweens.rest_map(owner, rig);
    let view = RigView {
        owner,
        rig,
        rests: &rests,
    };
    let spec = match reaction.choreography.cue(cue, &view, &mut rng.0) {
        Ok(spec) => spec,
        Err(err) => {
            warn!("{} rig {:?}: {:?} not played: {}", name, owner, cue, err);
            return;
        }
    };
    if let Some(idle) = gate.idle.take() {
        tweens.cancel(idle);
    }
    let sequence = tweens.play(owner, spec);
    gate.begin(sequence, cue);
    info!("{} rig {:?}: playing {:?}", name, owner, cue);
    commands.trigger(GateChanged {
        entity: owner,
        state: gate.state,
    });
}

pub fn settle_gate_observer(
    trigger: On<SequenceCompleted>,
    mut rigs: Query<(&Rig, &ClickReaction, &mut ClickGate)>,
    mut tweens: Tweens,
    mut rng: ResMut<AnimRng>,
    mut commands: Commands,
) {
    let done = trigger.event();
    let Ok((rig, reaction, mut gate)) = rigs.get_mut(done.owner) else {
        return;
    };
    let GateState::Animating { cue, .. } = gate.state else {
        return;
    };
    if !gate.settle(done.sequence) {
        return;
    }
    let owner = done.owner;
    info!(
        "{} rig {:?}: settled in {:?}",
        reaction.choreography.name(),
        owner,
        gate.state
    );
    let rests = tweens.rest_map(owner, rig);
    let view = RigView {
        owner,
        rig,
        rests: &rests,
    };
    if let Some(idle) = reaction.choreography.idle(cue, &view, &mut rng.0) {
        gate.idle = Some(tweens.play(owner, idle));
    }
    commands.trigger(GateChanged {
        entity: owner,
        state: gate.state,
    });
}
