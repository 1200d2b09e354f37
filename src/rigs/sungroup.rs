//! A group of suns that pop in, fly to their targets and float out of step.
//!
//! The `sun`, `renderer` and `target` slots are parallel lists: the i-th sun
//! fades through the i-th renderer and flies to the i-th target. A sun with
//! any of the three missing is left out.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};
use log::warn;

use crate::components::clickgate::{Cue, GateMode};
use crate::components::rig::{Choreography, Rig, RigView};
use crate::components::sequence::{Action, SequenceSpec};
use crate::components::tween::{Easing, LoopMode, Loops, Property, TweenSpec};
use crate::error::AnimError;
use crate::resources::animconfig::AnimationConfig;

pub const SECTION: &str = "sun_group";

#[derive(Clone, Debug, PartialEq)]
pub struct SunGroupTunables {
    pub move_duration: f32,
    pub fade_duration: f32,
    pub appear_scale_amount: f32,
    pub appear_scale_duration: f32,
    /// Float offsets are drawn from `float_min_amplitude..float_max_amplitude`.
    pub float_min_amplitude: f32,
    pub float_max_amplitude: f32,
    /// Float durations are this times a factor drawn from `0.8..1.2`.
    pub float_base_duration: f32,
    pub float_max_delay: f32,
}

impl Default for SunGroupTunables {
    fn default() -> Self {
        Self {
            move_duration: 1.2,
            fade_duration: 0.6,
            appear_scale_amount: 1.2,
            appear_scale_duration: 0.4,
            float_min_amplitude: 0.1,
            float_max_amplitude: 0.15,
            float_base_duration: 1.5,
            float_max_delay: 0.3,
        }
    }
}

impl SunGroupTunables {
    pub fn from_config(config: &AnimationConfig) -> Self {
        let d = Self::default();
        Self {
            move_duration: config.f32_or(SECTION, "move_duration", d.move_duration),
            fade_duration: config.f32_or(SECTION, "fade_duration", d.fade_duration),
            appear_scale_amount: config.f32_or(SECTION, "appear_scale_amount", d.appear_scale_amount),
            appear_scale_duration: config.f32_or(SECTION, "appear_scale_duration", d.appear_scale_duration),
            float_min_amplitude: config.f32_or(SECTION, "float_min_amplitude", d.float_min_amplitude),
            float_max_amplitude: config.f32_or(SECTION, "float_max_amplitude", d.float_max_amplitude),
            float_base_duration: config.f32_or(SECTION, "float_base_duration", d.float_base_duration),
            float_max_delay: config.f32_or(SECTION, "float_max_delay", d.float_max_delay),
        }
    }
}

struct Member {
    sun: Entity,
    renderer: Entity,
    start_scale: Vec3,
    target: Vec3,
}

#[derive(Clone, Debug, Default)]
pub struct SunGroup {
    pub tunables: SunGroupTunables,
}

impl SunGroup {
    fn members(view: &RigView) -> Vec<Member> {
        let suns = view.rig.parts("sun");
        let renderers = view.rig.parts("renderer");
        let targets = view.rig.parts("target");
        let mut members = Vec::with_capacity(suns.len());
        for (i, &sun) in suns.iter().enumerate() {
            let (Some(&renderer), Some(&target)) = (renderers.get(i), targets.get(i)) else {
                warn!("sun group {:?}: sun {} has no renderer or target", view.owner, i);
                continue;
            };
            match (view.rest_scale(sun), view.rest_position(target)) {
                (Ok(start_scale), Ok(target)) => members.push(Member {
                    sun,
                    renderer,
                    start_scale,
                    target,
                }),
                (Err(err), _) | (_, Err(err)) => {
                    warn!("sun group {:?}: sun {} left out: {}", view.owner, i, err)
                }
            }
        }
        members
    }
}

impl Choreography for SunGroup {
    fn name(&self) -> &'static str {
        SECTION
    }

    fn gate_mode(&self) -> GateMode {
        GateMode::OneShot
    }

    fn arm(&self, view: &RigView) -> Vec<Action> {
        view.rig
            .parts("renderer")
            .iter()
            .map(|&renderer| Action::set(renderer, Property::Opacity, 0.0))
            .collect()
    }

    fn cue(&self, _cue: Cue, view: &RigView, _rng: &mut fastrand::Rng) -> Result<SequenceSpec, AnimError> {
        let t = &self.tunables;
        let half = t.appear_scale_duration * 0.5;
        let mut spec = SequenceSpec::new();
        for m in Self::members(view) {
            let pop = SequenceSpec::new()
                .append_call(Action::set(m.sun, Property::Scale, m.start_scale * 0.8))
                .append(
                    TweenSpec::scale_to(m.sun, m.start_scale * t.appear_scale_amount, half)
                        .with_easing(Easing::BackOut),
                )
                .append(TweenSpec::scale_to(m.sun, m.start_scale, half).with_easing(Easing::SineInOut));
            let fade = TweenSpec::fade_to(m.renderer, 1.0, t.fade_duration)
                .from(0.0)
                .with_easing(Easing::SineInOut);
            let fly = TweenSpec::move_to(m.sun, m.target, t.move_duration).with_easing(Easing::BackOut);
            spec = spec
                .insert_sequence(0.0, pop)
                .insert(0.0, fade)
                .insert(0.0, fly);
        }
        Ok(spec)
    }

    fn idle(&self, _cue: Cue, view: &RigView, rng: &mut fastrand::Rng) -> Option<SequenceSpec> {
        let t = &self.tunables;
        let mut spec = SequenceSpec::new();
        for m in Self::members(view) {
            let amplitude = t.float_min_amplitude + (t.float_max_amplitude - t.float_min_amplitude) * rng.f32();
            let duration = t.float_base_duration * (0.8 + 0.4 * rng.f32());
            let direction = if rng.bool() { 1.0 } else { -1.0 };
            let delay = t.float_max_delay * rng.f32();
            let float = SequenceSpec::new()
                .append(
                    TweenSpec::move_y(m.sun, m.target.y + amplitude * direction, duration)
                        .with_easing(Easing::SineInOut)
                        .with_loops(Loops::Infinite, LoopMode::Yoyo),
                )
                .with_delay(delay);
            spec = spec.insert_sequence(0.0, float);
        }
        (!spec.is_empty()).then_some(spec)
    }
}

/// Three suns above `at`, each with its own target further up.
pub fn spawn(world: &mut World, at: Vec3, tunables: SunGroupTunables) -> Entity {
    let mut rig = Rig::new();
    for i in 0..3 {
        let x = (i as f32 - 1.0) * 1.5;
        let sun = super::spawn_part(world, at + Vec3::new(x, 0.0, 0.0));
        let renderer = super::spawn_sprite(world, at + Vec3::new(x, 0.0, 0.1), 1.0);
        let target = super::spawn_marker(world, at + Vec3::new(x * 1.5, 2.5, 0.0));
        rig = rig
            .with_part("sun", sun)
            .with_part("renderer", renderer)
            .with_part("target", target);
    }
    super::spawn_owner(world, at, Vec2::new(4.5, 1.5), rig, SunGroup { tunables })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rigs::testing::{rest, rests, tweens};

    #[test]
    fn test_incomplete_members_are_left_out() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let suns: Vec<Entity> = (0..2).map(|_| world.spawn_empty().id()).collect();
        let renderer = world.spawn_empty().id();
        let target = world.spawn_empty().id();
        let rig = Rig::new()
            .with_parts("sun", suns.iter().copied())
            .with_part("renderer", renderer)
            .with_part("target", target);
        let map = rests(&[
            (suns[0], rest(Vec3::ZERO, None)),
            (suns[1], rest(Vec3::ZERO, None)),
            (target, rest(Vec3::new(0.0, 2.0, 0.0), None)),
        ]);
        let view = RigView { owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(8);

        let spec = SunGroup::default().cue(Cue::Trigger, &view, &mut rng).expect("cue");
        assert!(spec.targets(suns[0]));
        assert!(!spec.targets(suns[1]));
        assert!((spec.total() - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_idle_offsets_stay_in_range() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let sun = world.spawn_empty().id();
        let renderer = world.spawn_empty().id();
        let target = world.spawn_empty().id();
        let rig = Rig::new()
            .with_part("sun", sun)
            .with_part("renderer", renderer)
            .with_part("target", target);
        let map = rests(&[
            (sun, rest(Vec3::ZERO, None)),
            (target, rest(Vec3::new(0.0, 2.0, 0.0), None)),
        ]);
        let view = RigView { owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(8);
        let group = SunGroup::default();

        for _ in 0..50 {
            let spec = group.idle(Cue::Trigger, &view, &mut rng).expect("idle");
            let all = tweens(&spec);
            let y = all[0].to.as_scalar().expect("scalar");
            let offset = (y - 2.0).abs();
            assert!((0.1 - 1e-5..=0.15 + 1e-5).contains(&offset));
            assert!((1.2 - 1e-5..=1.8 + 1e-5).contains(&all[0].duration));
        }
    }
}
