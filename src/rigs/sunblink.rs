//! Sun that wakes up on click: it keeps blinking, waving and dropping tears.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

use crate::components::clickgate::{Cue, GateMode};
use crate::components::rig::{Choreography, Rig, RigView};
use crate::components::sequence::{Action, SequenceSpec};
use crate::components::tween::{Easing, LoopMode, Loops, Property, TweenSpec};
use crate::error::AnimError;
use crate::resources::animconfig::AnimationConfig;

pub const SECTION: &str = "sun_blink";

#[derive(Clone, Debug, PartialEq)]
pub struct SunBlinkTunables {
    pub blink_fade_duration: f32,
    /// Wait before the first blink only.
    pub blink_delay: f32,
    pub arm_rotate_angle: f32,
    pub arm_duration: f32,
    pub drop_duration: f32,
    pub drop_interval: f32,
}

impl Default for SunBlinkTunables {
    fn default() -> Self {
        Self {
            blink_fade_duration: 0.4,
            blink_delay: 1.2,
            arm_rotate_angle: 18.0,
            arm_duration: 0.8,
            drop_duration: 1.3,
            drop_interval: 0.4,
        }
    }
}

impl SunBlinkTunables {
    pub fn from_config(config: &AnimationConfig) -> Self {
        let d = Self::default();
        Self {
            blink_fade_duration: config.f32_or(SECTION, "blink_fade_duration", d.blink_fade_duration),
            blink_delay: config.f32_or(SECTION, "blink_delay", d.blink_delay),
            arm_rotate_angle: config.f32_or(SECTION, "arm_rotate_angle", d.arm_rotate_angle),
            arm_duration: config.f32_or(SECTION, "arm_duration", d.arm_duration),
            drop_duration: config.f32_or(SECTION, "drop_duration", d.drop_duration),
            drop_interval: config.f32_or(SECTION, "drop_interval", d.drop_interval),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SunBlink {
    pub tunables: SunBlinkTunables,
}

impl SunBlink {
    fn drop_path(view: &RigView) -> Option<(Entity, Vec3, Vec3)> {
        let drop = view.rig.part("drop").ok()?;
        let start = view.rest_position(view.rig.part("drop_start").ok()?).ok()?;
        let end = view.rest_position(view.rig.part("drop_end").ok()?).ok()?;
        Some((drop, start, end))
    }
}

impl Choreography for SunBlink {
    fn name(&self) -> &'static str {
        SECTION
    }

    fn gate_mode(&self) -> GateMode {
        GateMode::OneShot
    }

    fn arm(&self, view: &RigView) -> Vec<Action> {
        let mut pose = Vec::new();
        if let Ok(eye) = view.rig.part("eye") {
            pose.push(Action::set(eye, Property::Opacity, 0.0));
        }
        if let Some((drop, start, _)) = Self::drop_path(view) {
            pose.push(Action::set(drop, Property::Position, start));
        }
        pose
    }

    /// Nothing plays on the click itself; the loops start once it settles.
    fn cue(&self, _cue: Cue, _view: &RigView, _rng: &mut fastrand::Rng) -> Result<SequenceSpec, AnimError> {
        Ok(SequenceSpec::new())
    }

    fn idle(&self, _cue: Cue, view: &RigView, _rng: &mut fastrand::Rng) -> Option<SequenceSpec> {
        let t = &self.tunables;
        let mut spec = SequenceSpec::new();

        if let Ok(eye) = view.rig.part("eye") {
            let open = view
                .rest(eye)
                .ok()
                .and_then(|rest| rest.opacity())
                .unwrap_or(1.0);
            let blink = SequenceSpec::new()
                .append(TweenSpec::fade_to(eye, open, t.blink_fade_duration).with_easing(Easing::SineInOut))
                .append(TweenSpec::fade_to(eye, 0.0, t.blink_fade_duration).with_easing(Easing::SineInOut))
                .with_loops(Loops::Infinite, LoopMode::Restart)
                .with_delay(t.blink_delay);
            spec = spec.insert_sequence(0.0, blink);
        }

        let wave = |arm: Entity, angle: f32| {
            TweenSpec::rotate_to(arm, angle, t.arm_duration)
                .with_easing(Easing::SineInOut)
                .with_loops(Loops::Infinite, LoopMode::Yoyo)
        };
        if let Ok(left) = view.rig.part("left_arm") {
            spec = spec.insert(0.0, wave(left, t.arm_rotate_angle));
        }
        if let Ok(right) = view.rig.part("right_arm") {
            spec = spec.insert(0.0, wave(right, -t.arm_rotate_angle));
        }

        if let Some((drop, start, end)) = Self::drop_path(view) {
            let tears = SequenceSpec::new()
                .append_call(Action::set(drop, Property::Position, start))
                .append(TweenSpec::move_to(drop, end, t.drop_duration).with_easing(Easing::SineInOut))
                .append_interval(t.drop_interval)
                .with_loops(Loops::Infinite, LoopMode::Restart);
            spec = spec.insert_sequence(0.0, tears);
        }

        (!spec.is_empty()).then_some(spec)
    }
}

pub fn spawn(world: &mut World, at: Vec3, tunables: SunBlinkTunables) -> Entity {
    let eye = super::spawn_sprite(world, at + Vec3::new(0.0, 0.2, 0.1), 1.0);
    let left = super::spawn_part(world, at + Vec3::new(-0.7, 0.0, -0.1));
    let right = super::spawn_part(world, at + Vec3::new(0.7, 0.0, -0.1));
    let drop_start = super::spawn_marker(world, at + Vec3::new(0.2, -0.1, 0.0));
    let drop_end = super::spawn_marker(world, at + Vec3::new(0.2, -1.2, 0.0));
    let drop = super::spawn_sprite(world, at + Vec3::new(0.2, -0.1, 0.1), 1.0);
    let rig = Rig::new()
        .with_part("eye", eye)
        .with_part("left_arm", left)
        .with_part("right_arm", right)
        .with_part("drop", drop)
        .with_part("drop_start", drop_start)
        .with_part("drop_end", drop_end);
    super::spawn_owner(world, at, Vec2::splat(1.8), rig, SunBlink { tunables })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::tween::PropertyValue;
    use crate::rigs::testing::{rest, rests, tweens};

    #[test]
    fn test_cue_is_empty_and_idle_loops() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let eye = world.spawn_empty().id();
        let left = world.spawn_empty().id();
        let rig = Rig::new().with_part("eye", eye).with_part("left_arm", left);
        let map = rests(&[(eye, rest(Vec3::ZERO, Some(0.9)))]);
        let view = RigView { owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(6);
        let sun = SunBlink::default();

        assert!(sun.cue(Cue::Trigger, &view, &mut rng).expect("cue").is_empty());
        let spec = sun.idle(Cue::Trigger, &view, &mut rng).expect("idle");
        assert!(spec.total().is_infinite());
        let all = tweens(&spec);
        let open = all.iter().find(|t| t.target == eye).map(|t| t.to);
        assert_eq!(open, Some(PropertyValue::Scalar(0.9)));
        assert!(all.iter().any(|t| t.target == left && t.loop_mode == LoopMode::Yoyo));
    }

    #[test]
    fn test_arm_closes_eye_and_parks_drop() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let eye = world.spawn_empty().id();
        let drop = world.spawn_empty().id();
        let start = world.spawn_empty().id();
        let end = world.spawn_empty().id();
        let rig = Rig::new()
            .with_part("eye", eye)
            .with_part("drop", drop)
            .with_part("drop_start", start)
            .with_part("drop_end", end);
        let map = rests(&[
            (start, rest(Vec3::new(0.0, 1.0, 0.0), None)),
            (end, rest(Vec3::new(0.0, -1.0, 0.0), None)),
        ]);
        let view = RigView { owner, rig: &rig, rests: &map };
        assert_eq!(
            SunBlink::default().arm(&view),
            vec![
                Action::set(eye, Property::Opacity, 0.0),
                Action::set(drop, Property::Position, Vec3::new(0.0, 1.0, 0.0)),
            ]
        );
    }
}
