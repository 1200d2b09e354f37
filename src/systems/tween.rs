//! Tween animation systems.
//!
//! Every running [`SequencePlayer`] is advanced by
//! [`tween_sequence_system`], which is the only place properties change over
//! time:
//!
//! 1. advance all players and collect their frames
//! 2. hand channel locks to newly activated tweens, cancelling the tween of
//!    any other sequence that held the channel
//! 3. apply property writes whose tween still owns its channel
//! 4. run actions (visibility, sound effects, signals); sequences started by
//!    `Play` take their first sweep now and go back to step 2
//! 5. release the locks of completed players, report and despawn them
//!
//! [`Tweens`] is the system parameter observers use to start, cancel and
//! restore animations outside of the tick.

use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemParam;
use glam::Vec3;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::components::mapposition::MapPosition;
use crate::components::opacity::Opacity;
use crate::components::reststate::RestState;
use crate::components::rig::Rig;
use crate::components::rotation::Rotation;
use crate::components::scale::Scale;
use crate::components::sequence::{Action, SequencePlayer, SequenceSpec};
use crate::components::tween::{Easing, Property, PropertyValue, TweenLocks};
use crate::components::visibility::Hidden;
use crate::error::AnimError;
use crate::events::audio::AudioCmd;
use crate::events::sequence::{SequenceCompleted, SequenceSignal};
use crate::resources::worldtime::WorldTime;
use crate::timeline::{Frame, PropertyHost};

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub(crate) fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
        Easing::SineIn => 1.0 - (t * std::f32::consts::FRAC_PI_2).cos(),
        Easing::SineOut => (t * std::f32::consts::FRAC_PI_2).sin(),
        Easing::SineInOut => -0.5 * ((std::f32::consts::PI * t).cos() - 1.0),
        Easing::BackOut => {
            const S: f32 = 1.70158;
            let p = t - 1.0;
            p * p * ((S + 1.0) * p + S) + 1.0
        }
        Easing::BounceOut => bounce_out(t),
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let p = t - 1.5 / D;
        N * p * p + 0.75
    } else if t < 2.5 / D {
        let p = t - 2.25 / D;
        N * p * p + 0.9375
    } else {
        let p = t - 2.625 / D;
        N * p * p + 0.984375
    }
}

/// Linearly interpolate between two 3D vectors.
pub(crate) fn lerp_v3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Linearly interpolate between two floats.
pub(crate) fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate two property values of the same kind. Mismatched kinds snap to `b`.
pub(crate) fn lerp_value(a: PropertyValue, b: PropertyValue, t: f32) -> PropertyValue {
    match (a, b) {
        (PropertyValue::Vector(a), PropertyValue::Vector(b)) => lerp_v3(a, b, t).into(),
        (PropertyValue::Scalar(a), PropertyValue::Scalar(b)) => lerp_f32(a, b, t).into(),
        (_, b) => b,
    }
}

/// Components a tween may read or write.
pub type AnimatedProps = (
    Option<&'static mut MapPosition>,
    Option<&'static mut Rotation>,
    Option<&'static mut Scale>,
    Option<&'static mut Opacity>,
    &'static mut TweenLocks,
);

/// Resolve a property through the animated-props query.
pub(crate) struct QueryHost<'q, 'w, 's> {
    pub props: &'q Query<'w, 's, AnimatedProps>,
}

impl PropertyHost for QueryHost<'_, '_, '_> {
    fn read(&self, target: Entity, property: Property) -> Result<PropertyValue, AnimError> {
        let Ok((pos, rot, scale, opacity, _)) = self.props.get(target) else {
            return Err(AnimError::MissingReference(target));
        };
        let value: Option<PropertyValue> = match property {
            Property::Position => pos.map(|p| p.pos.into()),
            Property::PositionY => pos.map(|p| p.pos.y.into()),
            Property::Rotation => rot.map(|r| r.degrees.into()),
            Property::Scale => scale.map(|s| s.scale.into()),
            Property::Opacity => opacity.map(|o| o.alpha.into()),
        };
        value.ok_or(AnimError::MissingCapability {
            entity: target,
            property,
            capability: property.capability(),
        })
    }
}

/// Write `value` into the matching component. Returns `false` when the
/// component is absent or the value kind does not fit the property.
pub(crate) fn store(
    pos: Option<Mut<MapPosition>>,
    rot: Option<Mut<Rotation>>,
    scale: Option<Mut<Scale>>,
    opacity: Option<Mut<Opacity>>,
    property: Property,
    value: PropertyValue,
) -> bool {
    match (property, value) {
        (Property::Position, PropertyValue::Vector(v)) => pos.map(|mut p| p.pos = v).is_some(),
        (Property::PositionY, PropertyValue::Scalar(y)) => pos.map(|mut p| p.pos.y = y).is_some(),
        (Property::Rotation, PropertyValue::Scalar(d)) => rot.map(|mut r| r.degrees = d).is_some(),
        (Property::Scale, PropertyValue::Vector(v)) => scale.map(|mut s| s.scale = v).is_some(),
        (Property::Opacity, PropertyValue::Scalar(a)) => {
            opacity.map(|mut o| o.alpha = a).is_some()
        }
        _ => false,
    }
}

/// Execute a non-property action on behalf of `owner`.
fn run_action(
    commands: &mut Commands,
    audio: &mut MessageWriter<AudioCmd>,
    sequence: Option<Entity>,
    owner: Entity,
    action: Action,
) {
    match action {
        Action::SetActive { target, active } => match commands.get_entity(target) {
            Ok(mut ec) => {
                if active {
                    ec.remove::<Hidden>();
                } else {
                    ec.insert(Hidden);
                }
            }
            Err(_) => warn!("SetActive on missing entity {:?}", target),
        },
        Action::PlayFx(id) => {
            audio.write(AudioCmd::PlayFx { id });
        }
        Action::Emit(signal) => {
            commands.trigger(SequenceSignal {
                sequence,
                owner,
                signal,
            });
        }
        Action::Play(spec) => {
            commands.spawn(SequencePlayer::new(owner, *spec));
        }
        // Property writes are folded into the frame by the sweep.
        Action::Set { .. } => {}
    }
}

/// One player's output for the current tick.
struct Pass {
    sequence: Entity,
    owner: Entity,
    frame: Frame,
}

/// Hand channels to newly activated tweens, cancelling the tween of any other
/// sequence that held the channel. `started` holds players spawned this tick
/// that are not in the world yet.
fn hand_over_locks(
    batch: &[Pass],
    props: &mut Query<AnimatedProps>,
    players: &mut Query<(Entity, &mut SequencePlayer)>,
    started: &mut [(Entity, SequencePlayer)],
) {
    for pass in batch {
        for &(target, channel, handle) in &pass.frame.claims {
            let Ok((.., mut locks)) = props.get_mut(target) else {
                continue;
            };
            let Some(prior) = locks.claim(channel, handle) else {
                continue;
            };
            if prior.sequence == handle.sequence {
                continue;
            }
            if let Ok((_, mut other)) = players.get_mut(prior.sequence) {
                other.cancel_tween(prior.node);
            } else if let Some((_, other)) = started.iter_mut().find(|(e, _)| *e == prior.sequence) {
                other.cancel_tween(prior.node);
            }
            debug!(
                "{:?} on {:?}: tween {:?} replaced by {:?}",
                channel, target, prior, handle
            );
        }
    }
}

/// Apply property writes whose tween still owns its channel.
fn apply_writes(batch: &[Pass], props: &mut Query<AnimatedProps>) {
    for pass in batch {
        for write in &pass.frame.writes {
            let Ok((pos, rot, scale, opacity, locks)) = props.get_mut(write.target) else {
                continue;
            };
            if write.handle.is_some()
                && locks.owner(write.property.channel()).map(|h| h.sequence) != Some(pass.sequence)
            {
                continue;
            }
            if !store(pos, rot, scale, opacity, write.property, write.value) {
                warn!(
                    "cannot write {:?} = {:?} on {:?}",
                    write.property, write.value, write.target
                );
            }
        }
    }
}

/// Drop every channel `sequence` still holds.
fn release_locks(props: &mut Query<AnimatedProps>, sequence: Entity) {
    for (.., mut locks) in props.iter_mut() {
        if locks.holds(sequence) {
            locks.release_sequence(sequence);
        }
    }
}

/// Advance every running [`SequencePlayer`] by the world delta.
///
/// Sequences started by a `Play` action run their first sweep in the same
/// tick, so they begin exactly when the action fires.
pub fn tween_sequence_system(
    world_time: Res<WorldTime>,
    mut players: Query<(Entity, &mut SequencePlayer)>,
    mut props: Query<AnimatedProps>,
    mut commands: Commands,
    mut audio: MessageWriter<AudioCmd>,
) {
    let dt = world_time.delta.max(0.0);
    let mut batch = Vec::new();
    let mut finished = Vec::new();
    {
        let host = QueryHost { props: &props };
        for (sequence, mut player) in players.iter_mut() {
            let Some((frame, completed)) = player.advance(sequence, dt, &host) else {
                continue;
            };
            if completed {
                finished.push((sequence, player.owner, player.signal().map(str::to_owned)));
            }
            batch.push(Pass {
                sequence,
                owner: player.owner,
                frame,
            });
        }
    }

    let mut started: Vec<(Entity, SequencePlayer)> = Vec::new();
    while !batch.is_empty() {
        hand_over_locks(&batch, &mut props, &mut players, &mut started);
        apply_writes(&batch, &mut props);

        let mut spawned = Vec::new();
        for pass in batch.drain(..) {
            for action in pass.frame.actions {
                match action {
                    Action::Play(spec) => spawned.push((pass.owner, *spec)),
                    other => run_action(&mut commands, &mut audio, Some(pass.sequence), pass.owner, other),
                }
            }
        }

        let host = QueryHost { props: &props };
        for (owner, spec) in spawned {
            let sequence = commands.spawn_empty().id();
            let mut player = SequencePlayer::new(owner, spec);
            if let Some((frame, completed)) = player.advance(sequence, dt, &host) {
                if completed {
                    finished.push((sequence, owner, player.signal().map(str::to_owned)));
                }
                batch.push(Pass {
                    sequence,
                    owner,
                    frame,
                });
            }
            started.push((sequence, player));
        }
    }

    for (sequence, player) in started {
        if player.is_running() {
            commands.entity(sequence).insert(player);
        }
    }

    for (sequence, owner, signal) in finished {
        debug!("sequence {:?} of {:?} completed", sequence, owner);
        release_locks(&mut props, sequence);
        commands.trigger(SequenceCompleted {
            sequence,
            owner,
            signal,
        });
        commands.entity(sequence).try_despawn();
    }
}

/// Start, cancel and restore animations from observers and systems.
///
/// Cancellation is immediate: the player stops writing in the same tick and
/// its entity is despawned when commands are applied.
#[derive(SystemParam)]
pub struct Tweens<'w, 's> {
    commands: Commands<'w, 's>,
    players: Query<'w, 's, (Entity, &'static mut SequencePlayer)>,
    props: Query<'w, 's, AnimatedProps>,
    rests: Query<'w, 's, &'static RestState>,
    audio: MessageWriter<'w, AudioCmd>,
}

impl Tweens<'_, '_> {
    /// Spawn a player for `spec` and return its handle.
    pub fn play(&mut self, owner: Entity, spec: SequenceSpec) -> Entity {
        self.commands.spawn(SequencePlayer::new(owner, spec)).id()
    }

    /// Cancel one sequence. Returns `false` if it was not running.
    pub fn cancel(&mut self, sequence: Entity) -> bool {
        let Ok((_, mut player)) = self.players.get_mut(sequence) else {
            return false;
        };
        let was_running = player.is_running();
        player.cancel();
        release_locks(&mut self.props, sequence);
        self.commands.entity(sequence).try_despawn();
        was_running
    }

    fn cancel_where(&mut self, pred: impl Fn(&SequencePlayer) -> bool) -> usize {
        let mut cancelled = 0;
        for (sequence, mut player) in self.players.iter_mut() {
            if player.is_running() && pred(&player) {
                player.cancel();
                release_locks(&mut self.props, sequence);
                self.commands.entity(sequence).try_despawn();
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Cancel every sequence started by `owner`.
    pub fn cancel_owned_by(&mut self, owner: Entity) -> usize {
        self.cancel_where(|p| p.owner == owner)
    }

    /// Cancel every sequence with a step touching `entity`.
    pub fn cancel_targeting(&mut self, entity: Entity) -> usize {
        self.cancel_where(|p| p.targets(entity))
    }

    pub fn rest(&self, entity: Entity) -> Option<RestState> {
        self.rests.get(entity).ok().copied()
    }

    /// Stop everything animating `entity` and write its rest snapshot back.
    /// Calling it twice leaves the entity in the same state.
    pub fn restore(&mut self, entity: Entity) -> Result<(), AnimError> {
        let rest = self.rest(entity).ok_or(AnimError::NotCaptured(entity))?;
        self.cancel_targeting(entity);
        let (pos, rot, scale, opacity, mut locks) = self
            .props
            .get_mut(entity)
            .map_err(|_| AnimError::MissingReference(entity))?;
        locks.clear();
        if let Some(mut p) = pos {
            p.pos = rest.position();
        }
        if let Some(mut r) = rot {
            r.degrees = rest.rotation();
        }
        if let Some(mut s) = scale {
            s.scale = rest.scale();
        }
        if let (Some(mut o), Some(alpha)) = (opacity, rest.opacity()) {
            o.alpha = alpha;
        }
        Ok(())
    }

    /// Run `action` right now instead of from a timeline.
    pub fn apply(&mut self, owner: Entity, action: Action) -> Result<(), AnimError> {
        match action {
            Action::Set {
                target,
                property,
                value,
            } => {
                let (pos, rot, scale, opacity, _) = self
                    .props
                    .get_mut(target)
                    .map_err(|_| AnimError::MissingReference(target))?;
                if store(pos, rot, scale, opacity, property, value) {
                    Ok(())
                } else {
                    Err(AnimError::MissingCapability {
                        entity: target,
                        property,
                        capability: property.capability(),
                    })
                }
            }
            other => {
                run_action(&mut self.commands, &mut self.audio, None, owner, other);
                Ok(())
            }
        }
    }

    /// Rest snapshots of the owner and every part of `rig`. Parts that were
    /// never captured are left out.
    pub fn rest_map(&self, owner: Entity, rig: &Rig) -> FxHashMap<Entity, RestState> {
        std::iter::once(owner)
            .chain(rig.all_parts())
            .filter_map(|e| self.rest(e).map(|r| (e, r)))
            .collect()
    }
}
