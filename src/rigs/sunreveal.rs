//! Sun that fades in with a pulse and wave, then breathes and sways.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

use crate::components::clickgate::{Cue, GateMode};
use crate::components::rig::{Choreography, Rig, RigView};
use crate::components::sequence::{Action, SequenceSpec};
use crate::components::tween::{Easing, LoopMode, Loops, Property, TweenSpec};
use crate::error::AnimError;
use crate::resources::animconfig::AnimationConfig;

pub const SECTION: &str = "sun_reveal";

#[derive(Clone, Debug, PartialEq)]
pub struct SunRevealTunables {
    pub fade_duration: f32,
    pub scale_amount: f32,
    /// Each half of the pulse.
    pub scale_duration: f32,
    pub arm_move_angle: f32,
    pub arm_anim_duration: f32,
    pub loop_scale_factor: f32,
    pub loop_scale_duration: f32,
    pub swing_angle: f32,
    pub swing_duration: f32,
}

impl Default for SunRevealTunables {
    fn default() -> Self {
        Self {
            fade_duration: 1.0,
            scale_amount: 1.1,
            scale_duration: 0.4,
            arm_move_angle: 20.0,
            arm_anim_duration: 0.5,
            loop_scale_factor: 1.05,
            loop_scale_duration: 1.2,
            swing_angle: 4.0,
            swing_duration: 1.5,
        }
    }
}

impl SunRevealTunables {
    pub fn from_config(config: &AnimationConfig) -> Self {
        let d = Self::default();
        Self {
            fade_duration: config.f32_or(SECTION, "fade_duration", d.fade_duration),
            scale_amount: config.f32_or(SECTION, "scale_amount", d.scale_amount),
            scale_duration: config.f32_or(SECTION, "scale_duration", d.scale_duration),
            arm_move_angle: config.f32_or(SECTION, "arm_move_angle", d.arm_move_angle),
            arm_anim_duration: config.f32_or(SECTION, "arm_anim_duration", d.arm_anim_duration),
            loop_scale_factor: config.f32_or(SECTION, "loop_scale_factor", d.loop_scale_factor),
            loop_scale_duration: config.f32_or(SECTION, "loop_scale_duration", d.loop_scale_duration),
            swing_angle: config.f32_or(SECTION, "swing_angle", d.swing_angle),
            swing_duration: config.f32_or(SECTION, "swing_duration", d.swing_duration),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SunReveal {
    pub tunables: SunRevealTunables,
}

impl SunReveal {
    fn breathe(&self, sun: Entity, rest_scale: Vec3) -> SequenceSpec {
        let t = &self.tunables;
        SequenceSpec::new()
            .append(
                TweenSpec::scale_to(sun, rest_scale * t.loop_scale_factor, t.loop_scale_duration)
                    .with_easing(Easing::SineInOut)
                    .with_loops(Loops::Infinite, LoopMode::Yoyo),
            )
            .join(
                TweenSpec::rotate_to(sun, t.swing_angle, t.swing_duration)
                    .with_easing(Easing::SineInOut)
                    .with_loops(Loops::Infinite, LoopMode::Yoyo),
            )
    }
}

impl Choreography for SunReveal {
    fn name(&self) -> &'static str {
        SECTION
    }

    fn gate_mode(&self) -> GateMode {
        GateMode::OneShot
    }

    fn arm(&self, view: &RigView) -> Vec<Action> {
        match view.rig.part("body") {
            Ok(body) => vec![Action::set(body, Property::Opacity, 0.0)],
            Err(_) => Vec::new(),
        }
    }

    fn cue(&self, _cue: Cue, view: &RigView, _rng: &mut fastrand::Rng) -> Result<SequenceSpec, AnimError> {
        let t = &self.tunables;
        let sun = view.owner;
        let rest = view.rest(sun)?;
        let mut spec = SequenceSpec::new();

        if let Ok(body) = view.rig.part("body") {
            spec = spec.insert(
                0.0,
                TweenSpec::fade_to(body, 1.0, t.fade_duration).with_easing(Easing::SineInOut),
            );
        }

        // The breathing loop takes over as soon as the pulse is back at rest.
        let pulse = SequenceSpec::new()
            .append_call(Action::set(sun, Property::Rotation, rest.rotation()))
            .append(
                TweenSpec::scale_to(sun, rest.scale() * t.scale_amount, t.scale_duration)
                    .with_easing(Easing::BackOut),
            )
            .append(TweenSpec::scale_to(sun, rest.scale(), t.scale_duration).with_easing(Easing::SineInOut))
            .append_call(Action::play(self.breathe(sun, rest.scale())));
        spec = spec.insert_sequence(0.0, pulse);

        for &arm in view.rig.parts("arm") {
            spec = spec.insert(
                0.0,
                TweenSpec::rotate_to(arm, t.arm_move_angle, t.arm_anim_duration)
                    .with_easing(Easing::QuadOut)
                    .with_loops(Loops::Finite(2), LoopMode::Yoyo),
            );
        }
        Ok(spec)
    }
}

pub fn spawn(world: &mut World, at: Vec3, tunables: SunRevealTunables) -> Entity {
    let body = super::spawn_sprite(world, at, 1.0);
    let left = super::spawn_part(world, at + Vec3::new(-0.7, 0.0, -0.1));
    let right = super::spawn_part(world, at + Vec3::new(0.7, 0.0, -0.1));
    let rig = Rig::new().with_part("body", body).with_parts("arm", [left, right]);
    super::spawn_owner(world, at, Vec2::splat(1.8), rig, SunReveal { tunables })
}
