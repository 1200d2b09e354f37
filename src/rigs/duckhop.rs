//! Duck that hops between its rest spot and a spot to the side, once per click.

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};

use crate::components::clickgate::{Cue, GateMode};
use crate::components::rig::{Choreography, Rig, RigView};
use crate::components::sequence::SequenceSpec;
use crate::components::tween::{Easing, TweenSpec};
use crate::error::AnimError;
use crate::resources::animconfig::AnimationConfig;

pub const SECTION: &str = "duck_hop";

#[derive(Clone, Debug, PartialEq)]
pub struct DuckHopTunables {
    /// Horizontal offset of the target spot.
    pub hop_distance: f32,
    pub hop_height: f32,
    pub hop_duration: f32,
}

impl Default for DuckHopTunables {
    fn default() -> Self {
        Self {
            hop_distance: 2.0,
            hop_height: 0.5,
            hop_duration: 0.6,
        }
    }
}

impl DuckHopTunables {
    pub fn from_config(config: &AnimationConfig) -> Self {
        let d = Self::default();
        Self {
            hop_distance: config.f32_or(SECTION, "hop_distance", d.hop_distance),
            hop_height: config.f32_or(SECTION, "hop_height", d.hop_height),
            hop_duration: config.f32_or(SECTION, "hop_duration", d.hop_duration),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DuckHop {
    pub tunables: DuckHopTunables,
}

impl DuckHop {
    /// Squash, rise to the arc top, land, squash again and settle.
    fn hop(&self, duck: Entity, from: Vec3, to: Vec3, rest_scale: Vec3) -> SequenceSpec {
        let t = &self.tunables;
        let d = t.hop_duration;
        let top = (from + to) * 0.5 + Vec3::new(0.0, t.hop_height, 0.0);
        let squash = rest_scale * Vec3::new(1.1, 0.9, 1.0);
        let stretch = rest_scale * Vec3::new(0.9, 1.1, 1.0);

        SequenceSpec::new()
            .append(TweenSpec::scale_to(duck, squash, d * 0.15).with_easing(Easing::QuadOut))
            .append(
                TweenSpec::move_to(duck, top, d * 0.35)
                    .from(from)
                    .with_easing(Easing::QuadOut),
            )
            .join(TweenSpec::scale_to(duck, stretch, d * 0.35))
            .append(TweenSpec::move_to(duck, to, d * 0.35).with_easing(Easing::QuadIn))
            .append(TweenSpec::scale_to(duck, squash, d * 0.15).with_easing(Easing::QuadOut))
            .append(TweenSpec::scale_to(duck, rest_scale, d * 0.1).with_easing(Easing::QuadIn))
    }
}

impl Choreography for DuckHop {
    fn name(&self) -> &'static str {
        SECTION
    }

    fn gate_mode(&self) -> GateMode {
        GateMode::Toggle
    }

    fn cue(&self, cue: Cue, view: &RigView, _rng: &mut fastrand::Rng) -> Result<SequenceSpec, AnimError> {
        let duck = view.owner;
        let rest = view.rest(duck)?;
        let start = rest.position();
        let target = start + Vec3::new(self.tunables.hop_distance, 0.0, 0.0);
        let (from, to) = match cue {
            Cue::ToStart => (target, start),
            Cue::ToTarget | Cue::Trigger => (start, target),
        };
        Ok(self.hop(duck, from, to, rest.scale()))
    }
}

pub fn spawn(world: &mut World, at: Vec3, tunables: DuckHopTunables) -> Entity {
    super::spawn_owner(world, at, Vec2::new(1.2, 1.0), Rig::new(), DuckHop { tunables })
}
