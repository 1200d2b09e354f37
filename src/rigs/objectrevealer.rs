//! Hidden objects that drop into place one by one, in random order, and
//! then keep swinging.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};
use log::warn;

use crate::components::clickgate::{Cue, GateMode};
use crate::components::rig::{Choreography, Rig, RigView};
use crate::components::sequence::{Action, SequenceSpec};
use crate::components::tween::{Easing, LoopMode, Loops, Property, TweenSpec};
use crate::error::AnimError;
use crate::resources::animconfig::AnimationConfig;
use crate::systems::reveal::reveal_in_random_order;

pub const SECTION: &str = "object_revealer";

#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRevealerTunables {
    pub appear_duration: f32,
    /// Height above the rest position an object drops from.
    pub drop_distance: f32,
    pub delay_between: f32,
    pub swing_angle: f32,
    pub swing_duration: f32,
    pub pop_sound: Option<String>,
}

impl Default for ObjectRevealerTunables {
    fn default() -> Self {
        Self {
            appear_duration: 0.6,
            drop_distance: 0.5,
            delay_between: 0.2,
            swing_angle: 8.0,
            swing_duration: 1.8,
            pop_sound: Some("pop".to_string()),
        }
    }
}

impl ObjectRevealerTunables {
    pub fn from_config(config: &AnimationConfig) -> Self {
        let d = Self::default();
        let pop_sound = match config.get(SECTION, "pop_sound") {
            Some("") => None,
            Some(id) => Some(id.to_string()),
            None => d.pop_sound,
        };
        Self {
            appear_duration: config.f32_or(SECTION, "appear_duration", d.appear_duration),
            drop_distance: config.f32_or(SECTION, "drop_distance", d.drop_distance),
            delay_between: config.f32_or(SECTION, "delay_between", d.delay_between),
            swing_angle: config.f32_or(SECTION, "swing_angle", d.swing_angle),
            swing_duration: config.f32_or(SECTION, "swing_duration", d.swing_duration),
            pop_sound,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ObjectRevealer {
    pub tunables: ObjectRevealerTunables,
}

impl ObjectRevealer {
    /// Drop, grow and fade one object in, then hand it to a swing loop.
    fn reveal_one(&self, object: Entity, view: &RigView) -> Option<SequenceSpec> {
        let t = &self.tunables;
        let rest = view.rest(object).ok()?;
        if rest.opacity().is_none() {
            warn!("object {:?} has no Opacity, not revealed", object);
            return None;
        }
        let home = rest.position();
        let drop_start = home + Vec3::new(0.0, t.drop_distance, 0.0);

        let mut item = SequenceSpec::new()
            .append_call(Action::SetActive { target: object, active: true })
            .append_call(Action::set(object, Property::Position, drop_start))
            .append_call(Action::set(object, Property::Scale, Vec3::ZERO))
            .append_call(Action::set(object, Property::Opacity, 0.0));
        if let Some(sound) = &t.pop_sound {
            item = item.append_call(Action::PlayFx(sound.clone()));
        }

        let swing = SequenceSpec::new().append(
            TweenSpec::rotate_to(object, t.swing_angle, t.swing_duration)
                .from(rest.rotation())
                .with_easing(Easing::SineInOut)
                .with_loops(Loops::Infinite, LoopMode::Yoyo),
        );

        Some(
            item.append(
                TweenSpec::move_to(object, home, t.appear_duration)
                    .from(drop_start)
                    .with_easing(Easing::BounceOut),
            )
            .join(
                TweenSpec::scale_to(object, Vec3::ONE, t.appear_duration)
                    .from(Vec3::ZERO)
                    .with_easing(Easing::BackOut),
            )
            .join(TweenSpec::fade_to(object, 1.0, t.appear_duration * 0.8).from(0.0))
            .insert_call(t.appear_duration, Action::play(swing)),
        )
    }
}

impl Choreography for ObjectRevealer {
    fn name(&self) -> &'static str {
        SECTION
    }

    fn gate_mode(&self) -> GateMode {
        GateMode::OneShot
    }

    fn arm(&self, view: &RigView) -> Vec<Action> {
        view.rig
            .parts("object")
            .iter()
            .flat_map(|&object| {
                [
                    Action::SetActive { target: object, active: false },
                    Action::set(object, Property::Scale, Vec3::ONE),
                ]
            })
            .collect()
    }

    fn cue(&self, _cue: Cue, view: &RigView, rng: &mut fastrand::Rng) -> Result<SequenceSpec, AnimError> {
        Ok(reveal_in_random_order(
            view.rig.parts("object"),
            self.tunables.delay_between,
            rng,
            |object| self.reveal_one(object, view),
        ))
    }
}

/// Five objects in a row at `at`.
pub fn spawn(world: &mut World, at: Vec3, tunables: ObjectRevealerTunables) -> Entity {
    let objects: Vec<Entity> = (0..5)
        .map(|i| super::spawn_sprite(world, at + Vec3::new(i as f32 - 2.0, 0.0, 0.0), 1.0))
        .collect();
    let rig = Rig::new().with_parts("object", objects);
    super::spawn_owner(world, at, Vec2::new(5.0, 1.5), rig, ObjectRevealer { tunables })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::sequence::Step;
    use crate::rigs::testing::{rest, rests, tweens};

    fn plays(spec: &SequenceSpec) -> Vec<(f32, SequenceSpec)> {
        spec.steps()
            .iter()
            .filter_map(|placed| match &placed.step {
                Step::Call(Action::Play(inner)) => Some((placed.start, (**inner).clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_arm_hides_every_object() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let rig = Rig::new().with_parts("object", [a, b]);
        let map = rests(&[]);
        let view = RigView { owner, rig: &rig, rests: &map };
        let pose = ObjectRevealer::default().arm(&view);
        assert!(pose.contains(&Action::SetActive { target: a, active: false }));
        assert!(pose.contains(&Action::SetActive { target: b, active: false }));
        assert_eq!(pose.len(), 4);
    }

    #[test]
    fn test_cue_staggers_every_object() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let objects: Vec<Entity> = (0..5).map(|_| world.spawn_empty().id()).collect();
        let rig = Rig::new().with_parts("object", objects.iter().copied());
        let entries: Vec<_> = objects
            .iter()
            .map(|&e| (e, rest(Vec3::ZERO, Some(1.0))))
            .collect();
        let map = rests(&entries);
        let view = RigView { owner, rig: &rig, rests: &map };
        let mut rng = fastrand::Rng::with_seed(9);

        let spec = ObjectRevealer::default()
            .cue(Cue::Trigger, &view, &mut rng)
            .expect("cue");
        let slots = plays(&spec);
        assert_eq!(slots.len(), 5);
        assert!(slots.last().is_some_and(|(start, _)| *start >= 0.8 - 1e-5));
        for pair in slots.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= 0.2 - 1e-5);
        }
        for object in &objects {
            assert_eq!(slots.iter().filter(|(_, item)| item.targets(*object)).count(), 1);
        }
    }

    #[test]
    fn test_item_drops_from_above_rest() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let object = world.spawn_empty().id();
        let rig = Rig::new().with_part("object", object);
        let map = rests(&[(object, rest(Vec3::new(1.0, 0.0, 0.0), Some(1.0)))]);
        let view = RigView { owner, rig: &rig, rests: &map };

        let item = ObjectRevealer::default()
            .reveal_one(object, &view)
            .expect("revealed");
        let drop = tweens(&item)
            .into_iter()
            .find(|t| t.property == Property::Position)
            .expect("drop tween");
        assert_eq!(drop.from, Some(Vec3::new(1.0, 0.5, 0.0).into()));
        assert_eq!(drop.to, Vec3::new(1.0, 0.0, 0.0).into());
        assert_eq!(drop.easing, Easing::BounceOut);
        assert!(item
            .steps()
            .iter()
            .any(|s| s.step == Step::Call(Action::PlayFx("pop".into()))));
    }

    #[test]
    fn test_object_without_opacity_is_skipped() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let object = world.spawn_empty().id();
        let rig = Rig::new().with_part("object", object);
        let map = rests(&[(object, rest(Vec3::ZERO, None))]);
        let view = RigView { owner, rig: &rig, rests: &map };
        assert!(ObjectRevealer::default().reveal_one(object, &view).is_none());
    }

    #[test]
    fn test_empty_pop_sound_disables_fx() {
        let mut config = AnimationConfig::new();
        config.set(SECTION, "pop_sound", "");
        config.set(SECTION, "delay_between", "0.5");
        let tunables = ObjectRevealerTunables::from_config(&config);
        assert_eq!(tunables.pop_sound, None);
        assert!((tunables.delay_between - 0.5).abs() < 1e-6);
    }
}
