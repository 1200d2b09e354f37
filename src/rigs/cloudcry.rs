//! Cloud that drifts to a target spot on click, then floats there and cries.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

use crate::components::clickgate::{Cue, GateMode};
use crate::components::rig::{Choreography, Rig, RigView};
use crate::components::sequence::{Action, SequenceSpec};
use crate::components::tween::{Easing, LoopMode, Loops, Property, TweenSpec};
use crate::error::AnimError;
use crate::resources::animconfig::AnimationConfig;

pub const SECTION: &str = "cloud_cry";

#[derive(Clone, Debug, PartialEq)]
pub struct CloudCryTunables {
    pub move_duration: f32,
    pub float_amplitude: f32,
    pub float_duration: f32,
    pub tear_drop_duration: f32,
    /// Pause between two tears.
    pub tear_interval: f32,
}

impl Default for CloudCryTunables {
    fn default() -> Self {
        Self {
            move_duration: 1.5,
            float_amplitude: 0.1,
            float_duration: 1.4,
            tear_drop_duration: 1.2,
            tear_interval: 0.4,
        }
    }
}

impl CloudCryTunables {
    pub fn from_config(config: &AnimationConfig) -> Self {
        let d = Self::default();
        Self {
            move_duration: config.f32_or(SECTION, "move_duration", d.move_duration),
            float_amplitude: config.f32_or(SECTION, "float_amplitude", d.float_amplitude),
            float_duration: config.f32_or(SECTION, "float_duration", d.float_duration),
            tear_drop_duration: config.f32_or(SECTION, "tear_drop_duration", d.tear_drop_duration),
            tear_interval: config.f32_or(SECTION, "tear_interval", d.tear_interval),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CloudCry {
    pub tunables: CloudCryTunables,
}

impl CloudCry {
    /// The cloud body, or the owner itself.
    fn body(view: &RigView) -> Entity {
        view.rig.part("body").unwrap_or(view.owner)
    }

    fn tear_path(view: &RigView) -> Option<(Entity, Vec3, Vec3)> {
        let tear = view.rig.part("tear").ok()?;
        let start = view.rest_position(view.rig.part("tear_start").ok()?).ok()?;
        let end = view.rest_position(view.rig.part("tear_end").ok()?).ok()?;
        Some((tear, start, end))
    }
}

impl Choreography for CloudCry {
    fn name(&self) -> &'static str {
        SECTION
    }

    fn gate_mode(&self) -> GateMode {
        GateMode::OneShot
    }

    fn arm(&self, view: &RigView) -> Vec<Action> {
        match Self::tear_path(view) {
            Some((tear, start, _)) => vec![Action::set(tear, Property::Position, start)],
            None => Vec::new(),
        }
    }

    fn cue(&self, _cue: Cue, view: &RigView, _rng: &mut fastrand::Rng) -> Result<SequenceSpec, AnimError> {
        let target = view.rest_position(view.rig.part("target")?)?;
        Ok(SequenceSpec::new().append(
            TweenSpec::move_to(Self::body(view), target, self.tunables.move_duration)
                .with_easing(Easing::SineInOut),
        ))
    }

    fn idle(&self, _cue: Cue, view: &RigView, _rng: &mut fastrand::Rng) -> Option<SequenceSpec> {
        let t = &self.tunables;
        let mut spec = SequenceSpec::new();

        if let Ok(target) = view.rig.part("target").and_then(|e| view.rest_position(e)) {
            spec = spec.insert(
                0.0,
                TweenSpec::move_y(Self::body(view), target.y + t.float_amplitude, t.float_duration)
                    .with_easing(Easing::SineInOut)
                    .with_loops(Loops::Infinite, LoopMode::Yoyo),
            );
        }

        if let Some((tear, start, end)) = Self::tear_path(view) {
            let cry = SequenceSpec::new()
                .append(
                    TweenSpec::move_to(tear, end, t.tear_drop_duration)
                        .from(start)
                        .with_easing(Easing::SineInOut),
                )
                .append_call(Action::set(tear, Property::Position, start))
                .append_interval(t.tear_interval)
                .with_loops(Loops::Infinite, LoopMode::Restart);
            spec = spec.insert_sequence(0.0, cry);
        }

        (!spec.is_empty()).then_some(spec)
    }
}

pub fn spawn(world: &mut World, at: Vec3, tunables: CloudCryTunables) -> Entity {
    let body = super::spawn_part(world, at);
    let tear_start = super::spawn_marker(world, at + Vec3::new(0.0, -0.4, 0.0));
    let tear_end = super::spawn_marker(world, at + Vec3::new(0.0, -1.6, 0.0));
    let tear = super::spawn_sprite(world, at + Vec3::new(0.0, -0.4, 0.1), 1.0);
    let target = super::spawn_marker(world, at + Vec3::new(3.0, 0.5, 0.0));
    let rig = Rig::new()
        .with_part("body", body)
        .with_part("tear", tear)
        .with_part("tear_start", tear_start)
        .with_part("tear_end", tear_end)
        .with_part("target", target);
    super::spawn_owner(world, at, Vec2::new(2.0, 1.2), rig, CloudCry { tunables })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rigs::testing::{rest, rests, tweens};

    struct Parts {
        owner: Entity,
        body: Entity,
        tear: Entity,
        start: Entity,
        end: Entity,
        target: Entity,
    }

    fn parts(world: &mut World) -> Parts {
        Parts {
            owner: world.spawn_empty().id(),
            body: world.spawn_empty().id(),
            tear: world.spawn_empty().id(),
            start: world.spawn_empty().id(),
            end: world.spawn_empty().id(),
            target: world.spawn_empty().id(),
        }
    }

    #[test]
    fn test_cue_drifts_body_to_target() {
        let mut world = World::new();
        let p = parts(&mut world);
        let rig = Rig::new().with_part("body", p.body).with_part("target", p.target);
        let map = rests(&[(p.target, rest(Vec3::new(3.0, 1.0, 0.0), None))]);
        let view = RigView { owner: p.owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(4);

        let spec = CloudCry::default().cue(Cue::Trigger, &view, &mut rng).expect("cue");
        let all = tweens(&spec);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].target, p.body);
        assert_eq!(all[0].to, Vec3::new(3.0, 1.0, 0.0).into());
    }

    #[test]
    fn test_cue_without_target_is_rejected() {
        let mut world = World::new();
        let p = parts(&mut world);
        let rig = Rig::new().with_part("body", p.body);
        let map = rests(&[]);
        let view = RigView { owner: p.owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(4);
        assert_eq!(
            CloudCry::default().cue(Cue::Trigger, &view, &mut rng),
            Err(AnimError::MissingPart("target"))
        );
    }

    #[test]
    fn test_idle_floats_and_drops_tears() {
        let mut world = World::new();
        let p = parts(&mut world);
        let rig = Rig::new()
            .with_part("body", p.body)
            .with_part("tear", p.tear)
            .with_part("tear_start", p.start)
            .with_part("tear_end", p.end)
            .with_part("target", p.target);
        let map = rests(&[
            (p.start, rest(Vec3::new(0.0, -0.4, 0.0), None)),
            (p.end, rest(Vec3::new(0.0, -1.6, 0.0), None)),
            (p.target, rest(Vec3::new(3.0, 1.0, 0.0), None)),
        ]);
        let view = RigView { owner: p.owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(4);

        let cloud = CloudCry::default();
        assert_eq!(
            cloud.arm(&view),
            vec![Action::set(p.tear, Property::Position, Vec3::new(0.0, -0.4, 0.0))]
        );
        let spec = cloud.idle(Cue::Trigger, &view, &mut rng).expect("idle");
        assert!(spec.total().is_infinite());
        let all = tweens(&spec);
        let float = all.iter().find(|t| t.target == p.body).expect("float");
        assert!((float.to.as_scalar().unwrap_or_default() - 1.1).abs() < 1e-5);
        let drop = all.iter().find(|t| t.target == p.tear).expect("tear");
        assert_eq!(drop.from, Some(Vec3::new(0.0, -0.4, 0.0).into()));
        assert_eq!(drop.to, Vec3::new(0.0, -1.6, 0.0).into());
    }
}
