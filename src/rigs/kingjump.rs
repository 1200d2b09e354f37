//! King that jumps, shakes his head and laughs on every click.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};
use log::warn;

use crate::components::clickgate::{Cue, GateMode};
use crate::components::rig::{Choreography, Rig, RigView};
use crate::components::sequence::{Action, SequenceSpec};
use crate::components::tween::{Easing, LoopMode, Loops, Property, TweenSpec};
use crate::error::AnimError;
use crate::resources::animconfig::AnimationConfig;

pub const SECTION: &str = "king_jump";

#[derive(Clone, Debug, PartialEq)]
pub struct KingJumpTunables {
    pub jump_height: f32,
    /// Up and down together.
    pub jump_duration: f32,
    pub head_shake_angle: f32,
    pub head_shake_duration: f32,
    pub head_shake_loops: u32,
    pub laugh_scale: f32,
    pub laugh_duration: f32,
    pub arm_angle: f32,
    pub arm_duration: f32,
}

impl Default for KingJumpTunables {
    fn default() -> Self {
        Self {
            jump_height: 0.5,
            jump_duration: 0.4,
            head_shake_angle: 15.0,
            head_shake_duration: 0.25,
            head_shake_loops: 4,
            laugh_scale: 1.1,
            laugh_duration: 0.3,
            arm_angle: 10.0,
            arm_duration: 0.2,
        }
    }
}

impl KingJumpTunables {
    pub fn from_config(config: &AnimationConfig) -> Self {
        let d = Self::default();
        let loops = config.i32_or(SECTION, "head_shake_loops", d.head_shake_loops as i32);
        Self {
            jump_height: config.f32_or(SECTION, "jump_height", d.jump_height),
            jump_duration: config.f32_or(SECTION, "jump_duration", d.jump_duration),
            head_shake_angle: config.f32_or(SECTION, "head_shake_angle", d.head_shake_angle),
            head_shake_duration: config.f32_or(SECTION, "head_shake_duration", d.head_shake_duration),
            head_shake_loops: loops.max(1) as u32,
            laugh_scale: config.f32_or(SECTION, "laugh_scale", d.laugh_scale),
            laugh_duration: config.f32_or(SECTION, "laugh_duration", d.laugh_duration),
            arm_angle: config.f32_or(SECTION, "arm_angle", d.arm_angle),
            arm_duration: config.f32_or(SECTION, "arm_duration", d.arm_duration),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct KingJump {
    pub tunables: KingJumpTunables,
}

impl Choreography for KingJump {
    fn name(&self) -> &'static str {
        SECTION
    }

    fn gate_mode(&self) -> GateMode {
        GateMode::Repeat
    }

    fn cue(&self, _cue: Cue, view: &RigView, _rng: &mut fastrand::Rng) -> Result<SequenceSpec, AnimError> {
        let t = &self.tunables;
        let mut spec = SequenceSpec::new();

        match view.rig.part("body").and_then(|b| view.rest_position(b).map(|p| (b, p))) {
            Ok((body, rest)) => {
                let half = t.jump_duration * 0.5;
                let jump = SequenceSpec::new()
                    .append(
                        TweenSpec::move_y(body, rest.y + t.jump_height, half).with_easing(Easing::QuadOut),
                    )
                    .append(TweenSpec::move_y(body, rest.y, half).with_easing(Easing::QuadIn));
                spec = spec.insert_sequence(0.0, jump);
            }
            Err(err) => warn!("king {:?} does not jump: {}", view.owner, err),
        }

        if let Ok(head) = view.rig.part("head")
            && let Ok(rest) = view.rest_rotation(head)
        {
            let shake = SequenceSpec::new()
                .append(
                    TweenSpec::rotate_to(head, t.head_shake_angle, t.head_shake_duration)
                        .with_easing(Easing::SineInOut)
                        .with_loops(Loops::Finite(t.head_shake_loops), LoopMode::Yoyo),
                )
                .append_call(Action::set(head, Property::Rotation, rest));
            spec = spec.join_sequence(shake);
        }

        for &arm in view.rig.parts("arm") {
            spec = spec.insert(
                0.0,
                TweenSpec::rotate_to(arm, t.arm_angle, t.arm_duration)
                    .with_easing(Easing::SineInOut)
                    .with_loops(Loops::Finite(2), LoopMode::Yoyo),
            );
        }

        let scale = view.rest_scale(view.owner)?;
        Ok(spec.insert(
            0.0,
            TweenSpec::scale_to(view.owner, scale * t.laugh_scale, t.laugh_duration)
                .with_easing(Easing::BackOut)
                .with_loops(Loops::Finite(2), LoopMode::Yoyo),
        ))
    }
}

pub fn spawn(world: &mut World, at: Vec3, tunables: KingJumpTunables) -> Entity {
    let body = super::spawn_part(world, at);
    let head = super::spawn_part(world, at + Vec3::new(0.0, 0.8, -0.1));
    let left = super::spawn_part(world, at + Vec3::new(-0.5, 0.2, -0.2));
    let right = super::spawn_part(world, at + Vec3::new(0.5, 0.2, -0.2));
    let rig = Rig::new()
        .with_part("body", body)
        .with_part("head", head)
        .with_parts("arm", [left, right]);
    super::spawn_owner(world, at, Vec2::new(1.4, 2.0), rig, KingJump { tunables })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tween::PropertyValue;
    use crate::rigs::testing::{rest, rests, tweens};

    #[test]
    fn test_cue_lasts_as_long_as_the_head_shake() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let body = world.spawn_empty().id();
        let head = world.spawn_empty().id();
        let arm = world.spawn_empty().id();
        let rig = Rig::new()
            .with_part("body", body)
            .with_part("head", head)
            .with_part("arm", arm);
        let map = rests(&[
            (owner, rest(Vec3::ZERO, None)),
            (body, rest(Vec3::new(0.0, -1.0, 0.0), None)),
            (head, rest(Vec3::ZERO, None)),
        ]);
        let view = RigView { owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(5);

        let spec = KingJump::default().cue(Cue::Trigger, &view, &mut rng).expect("cue");
        assert!((spec.total() - 1.0).abs() < 1e-5);
        // Jump, shake, arms and laugh all start on the click.
        assert!(spec.steps().iter().all(|s| s.start == 0.0));

        let all = tweens(&spec);
        let jump_top = all.iter().find(|t| t.target == body).map(|t| t.to);
        assert_eq!(jump_top, Some(PropertyValue::Scalar(-0.5)));
        let laugh = all.iter().find(|t| t.target == owner).expect("laugh");
        assert_eq!(laugh.to, Vec3::splat(1.1).into());
        assert_eq!(laugh.loops, Loops::Finite(2));
    }

    #[test]
    fn test_missing_parts_leave_the_laugh() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let rig = Rig::new();
        let map = rests(&[(owner, rest(Vec3::ZERO, None))]);
        let view = RigView { owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(5);

        let spec = KingJump::default().cue(Cue::Trigger, &view, &mut rng).expect("cue");
        assert_eq!(tweens(&spec).len(), 1);
        assert!((spec.total() - 0.6).abs() < 1e-5);
    }
}
