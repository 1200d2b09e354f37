//! Girl sun: grows to full size on click, then blinks, waves and floats.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

use crate::components::clickgate::{Cue, GateMode};
use crate::components::rig::{Choreography, Rig, RigView};
use crate::components::sequence::{Action, SequenceSpec};
use crate::components::tween::{Easing, LoopMode, Loops, Property, TweenSpec};
use crate::error::AnimError;
use crate::resources::animconfig::AnimationConfig;

pub const SECTION: &str = "sun_girl";

#[derive(Clone, Debug, PartialEq)]
pub struct SunGirlTunables {
    /// Body scale factor while waiting for the click.
    pub appear_start_scale: f32,
    pub appear_duration: f32,
    pub arm_rotation_angle: f32,
    pub arm_wave_duration: f32,
    pub blink_duration: f32,
    /// Open time between two blinks.
    pub blink_loop_interval: f32,
    pub float_amplitude: f32,
    pub float_duration: f32,
}

impl Default for SunGirlTunables {
    fn default() -> Self {
        Self {
            appear_start_scale: 0.7,
            appear_duration: 0.5,
            arm_rotation_angle: 25.0,
            arm_wave_duration: 0.8,
            blink_duration: 0.1,
            blink_loop_interval: 1.5,
            float_amplitude: 0.1,
            float_duration: 1.2,
        }
    }
}

impl SunGirlTunables {
    pub fn from_config(config: &AnimationConfig) -> Self {
        let d = Self::default();
        Self {
            appear_start_scale: config.f32_or(SECTION, "appear_start_scale", d.appear_start_scale),
            appear_duration: config.f32_or(SECTION, "appear_duration", d.appear_duration),
            arm_rotation_angle: config.f32_or(SECTION, "arm_rotation_angle", d.arm_rotation_angle),
            arm_wave_duration: config.f32_or(SECTION, "arm_wave_duration", d.arm_wave_duration),
            blink_duration: config.f32_or(SECTION, "blink_duration", d.blink_duration),
            blink_loop_interval: config.f32_or(SECTION, "blink_loop_interval", d.blink_loop_interval),
            float_amplitude: config.f32_or(SECTION, "float_amplitude", d.float_amplitude),
            float_duration: config.f32_or(SECTION, "float_duration", d.float_duration),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SunGirl {
    pub tunables: SunGirlTunables,
}

impl Choreography for SunGirl {
    fn name(&self) -> &'static str {
        SECTION
    }

    fn gate_mode(&self) -> GateMode {
        GateMode::OneShot
    }

    fn arm(&self, view: &RigView) -> Vec<Action> {
        let mut pose = Vec::new();
        if let Ok(body) = view.rig.part("body")
            && let Ok(scale) = view.rest_scale(body)
        {
            pose.push(Action::set(
                body,
                Property::Scale,
                scale * self.tunables.appear_start_scale,
            ));
        }
        if let Ok(eyelid) = view.rig.part("eyelid") {
            pose.push(Action::set(eyelid, Property::Opacity, 1.0));
        }
        pose
    }

    fn cue(&self, _cue: Cue, view: &RigView, _rng: &mut fastrand::Rng) -> Result<SequenceSpec, AnimError> {
        let t = &self.tunables;
        // Without a body the loops start straight away.
        let Ok(body) = view.rig.part("body") else {
            return Ok(SequenceSpec::new());
        };
        let rest = view.rest_scale(body)?;
        Ok(SequenceSpec::new()
            .append(TweenSpec::scale_to(body, rest, t.appear_duration).with_easing(Easing::BackOut)))
    }

    fn idle(&self, _cue: Cue, view: &RigView, _rng: &mut fastrand::Rng) -> Option<SequenceSpec> {
        let t = &self.tunables;
        let mut spec = SequenceSpec::new();

        if let Ok(eyelid) = view.rig.part("eyelid") {
            let blink = SequenceSpec::new()
                .append_interval(t.blink_loop_interval)
                .append(TweenSpec::fade_to(eyelid, 0.0, t.blink_duration))
                .append(TweenSpec::fade_to(eyelid, 1.0, t.blink_duration))
                .with_loops(Loops::Infinite, LoopMode::Restart);
            spec = spec.insert_sequence(0.0, blink);
        }

        let wave = |target: Entity, angle: f32| {
            TweenSpec::rotate_to(target, angle, t.arm_wave_duration)
                .with_easing(Easing::SineInOut)
                .with_loops(Loops::Infinite, LoopMode::Yoyo)
        };
        if let Ok(left) = view.rig.part("left_arm") {
            spec = spec.insert(0.0, wave(left, t.arm_rotation_angle));
        }
        if let Ok(right) = view.rig.part("right_arm") {
            spec = spec.insert(0.0, wave(right, -t.arm_rotation_angle));
        }

        if let Ok(body) = view.rig.part("body")
            && let Ok(rest) = view.rest_position(body)
        {
            spec = spec.insert(
                0.0,
                TweenSpec::move_y(body, rest.y + t.float_amplitude, t.float_duration)
                    .with_easing(Easing::SineInOut)
                    .with_loops(Loops::Infinite, LoopMode::Yoyo),
            );
        }

        (!spec.is_empty()).then_some(spec)
    }
}

pub fn spawn(world: &mut World, at: Vec3, tunables: SunGirlTunables) -> Entity {
    let body = super::spawn_part(world, at);
    let left = super::spawn_part(world, at + Vec3::new(-0.6, 0.0, -0.1));
    let right = super::spawn_part(world, at + Vec3::new(0.6, 0.0, -0.1));
    let eyelid = super::spawn_sprite(world, at + Vec3::new(0.0, 0.2, 0.1), 1.0);
    let rig = Rig::new()
        .with_part("body", body)
        .with_part("left_arm", left)
        .with_part("right_arm", right)
        .with_part("eyelid", eyelid);
    super::spawn_owner(world, at, Vec2::splat(1.6), rig, SunGirl { tunables })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tween::PropertyValue;
    use crate::rigs::testing::{rest, rests, tweens};

    #[test]
    fn test_arm_shrinks_body_and_opens_eyes() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let body = world.spawn_empty().id();
        let eyelid = world.spawn_empty().id();
        let rig = Rig::new().with_part("body", body).with_part("eyelid", eyelid);
        let map = rests(&[(body, rest(Vec3::ZERO, None))]);
        let view = RigView { owner, rig: &rig, rests: &map };

        let pose = SunGirl::default().arm(&view);
        assert_eq!(
            pose,
            vec![
                Action::set(body, Property::Scale, Vec3::splat(0.7)),
                Action::set(eyelid, Property::Opacity, 1.0),
            ]
        );
    }

    #[test]
    fn test_cue_grows_back_to_rest_scale() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let body = world.spawn_empty().id();
        let rig = Rig::new().with_part("body", body);
        let map = rests(&[(body, rest(Vec3::ZERO, None))]);
        let view = RigView { owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(1);

        let spec = SunGirl::default().cue(Cue::Trigger, &view, &mut rng).expect("cue");
        let all = tweens(&spec);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].to, PropertyValue::Vector(Vec3::ONE));
        assert_eq!(all[0].easing, Easing::BackOut);
        assert!((spec.total() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_idle_loops_forever_and_mirrors_arms() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let body = world.spawn_empty().id();
        let left = world.spawn_empty().id();
        let right = world.spawn_empty().id();
        let eyelid = world.spawn_empty().id();
        let rig = Rig::new()
            .with_part("body", body)
            .with_part("left_arm", left)
            .with_part("right_arm", right)
            .with_part("eyelid", eyelid);
        let map = rests(&[(body, rest(Vec3::new(0.0, 2.0, 0.0), None))]);
        let view = RigView { owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(1);

        let spec = SunGirl::default()
            .idle(Cue::Trigger, &view, &mut rng)
            .expect("idle loops");
        assert!(spec.total().is_infinite());
        let all = tweens(&spec);
        let angle_of = |e: Entity| all.iter().find(|t| t.target == e).map(|t| t.to);
        assert_eq!(angle_of(left), Some(PropertyValue::Scalar(25.0)));
        assert_eq!(angle_of(right), Some(PropertyValue::Scalar(-25.0)));
        let float = all
            .iter()
            .find(|t| t.property == Property::PositionY)
            .expect("float tween");
        let y = float.to.as_scalar().expect("scalar");
        assert!((y - 2.1).abs() < 1e-5);
    }

    #[test]
    fn test_missing_body_still_cues() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let rig = Rig::new();
        let map = rests(&[]);
        let view = RigView { owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(1);
        let spec = SunGirl::default().cue(Cue::Trigger, &view, &mut rng).expect("cue");
        assert!(spec.is_empty());
        assert!(SunGirl::default().idle(Cue::Trigger, &view, &mut rng).is_none());
    }
}
