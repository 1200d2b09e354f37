//! Character rig choreographies.
//!
//! Each submodule holds one kind of clickable rig: its tunables (with
//! defaults and INI overrides), its [`Choreography`] and a spawn helper that
//! builds a default part layout around a position.
//!
//! - [`sungirl`] – girl sun grows in, then blinks, waves and floats
//! - [`objectrevealer`] – hidden objects drop in one by one in random order
//! - [`duckhop`] – duck hops back and forth on every click
//! - [`kingjump`] – king jumps and laughs, again on every click
//! - [`sunreveal`] – sun fades in with a pulse, then breathes and sways
//! - [`cloudcry`] – cloud drifts to its target, then floats and cries
//! - [`sungroup`] – a group of suns flies in and floats at random
//! - [`sunblink`] – sun starts blinking, waving and dropping tears

pub mod cloudcry;
pub mod duckhop;
pub mod kingjump;
pub mod objectrevealer;
pub mod sunblink;
pub mod sungirl;
pub mod sungroup;
pub mod sunreveal;

use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::clickgate::ClickGate;
use crate::components::hitbox::HitBox;
use crate::components::mapposition::MapPosition;
use crate::components::opacity::Opacity;
use crate::components::rig::{Choreography, ClickReaction, Rig};
use crate::components::rotation::Rotation;
use crate::components::scale::Scale;
use crate::resources::animconfig::AnimationConfig;

/// Every rig kind a scene file can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RigKind {
    SunGirl,
    ObjectRevealer,
    DuckHop,
    KingJump,
    SunReveal,
    CloudCry,
    SunGroup,
    SunBlink,
}

impl RigKind {
    pub const ALL: [RigKind; 8] = [
        RigKind::SunGirl,
        RigKind::ObjectRevealer,
        RigKind::DuckHop,
        RigKind::KingJump,
        RigKind::SunReveal,
        RigKind::CloudCry,
        RigKind::SunGroup,
        RigKind::SunBlink,
    ];

    /// INI section holding this kind's tunables.
    pub fn section(self) -> &'static str {
        match self {
            RigKind::SunGirl => sungirl::SECTION,
            RigKind::ObjectRevealer => objectrevealer::SECTION,
            RigKind::DuckHop => duckhop::SECTION,
            RigKind::KingJump => kingjump::SECTION,
            RigKind::SunReveal => sunreveal::SECTION,
            RigKind::CloudCry => cloudcry::SECTION,
            RigKind::SunGroup => sungroup::SECTION,
            RigKind::SunBlink => sunblink::SECTION,
        }
    }

    /// Spawn the default layout of this rig around `at`, tuned from `config`.
    pub fn spawn(self, world: &mut World, at: Vec3, config: &AnimationConfig) -> Entity {
        match self {
            RigKind::SunGirl => sungirl::spawn(world, at, sungirl::SunGirlTunables::from_config(config)),
            RigKind::ObjectRevealer => objectrevealer::spawn(
                world,
                at,
                objectrevealer::ObjectRevealerTunables::from_config(config),
            ),
            RigKind::DuckHop => duckhop::spawn(world, at, duckhop::DuckHopTunables::from_config(config)),
            RigKind::KingJump => {
                kingjump::spawn(world, at, kingjump::KingJumpTunables::from_config(config))
            }
            RigKind::SunReveal => {
                sunreveal::spawn(world, at, sunreveal::SunRevealTunables::from_config(config))
            }
            RigKind::CloudCry => cloudcry::spawn(world, at, cloudcry::CloudCryTunables::from_config(config)),
            RigKind::SunGroup => sungroup::spawn(world, at, sungroup::SunGroupTunables::from_config(config)),
            RigKind::SunBlink => sunblink::spawn(world, at, sunblink::SunBlinkTunables::from_config(config)),
        }
    }
}

/// Transform-only part.
pub(crate) fn spawn_part(world: &mut World, pos: Vec3) -> Entity {
    world
        .spawn((MapPosition { pos }, Rotation::default(), Scale::default()))
        .id()
}

/// Part that can also be faded.
pub(crate) fn spawn_sprite(world: &mut World, pos: Vec3, alpha: f32) -> Entity {
    world
        .spawn((
            MapPosition { pos },
            Rotation::default(),
            Scale::default(),
            Opacity::new(alpha),
        ))
        .id()
}

/// Position-only reference point (targets, tear start and end).
pub(crate) fn spawn_marker(world: &mut World, pos: Vec3) -> Entity {
    world.spawn(MapPosition { pos }).id()
}

/// Clickable owner entity carrying the gate, hit box and choreography.
pub(crate) fn spawn_owner(
    world: &mut World,
    at: Vec3,
    hit_size: Vec2,
    rig: Rig,
    choreography: impl Choreography,
) -> Entity {
    let gate = ClickGate::new(choreography.gate_mode());
    world
        .spawn((
            MapPosition { pos: at },
            Rotation::default(),
            Scale::default(),
            HitBox::centered(hit_size.x, hit_size.y),
            gate,
            rig,
            ClickReaction::new(choreography),
        ))
        .id()
}
