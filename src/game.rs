//! World setup, the per-tick schedule and JSON scene loading.
//!
//! A scene file lists rigs by kind and position plus optional scripted
//! input, e.g.
//!
//! ```json
//! {
//!   "rigs": [
//!     { "kind": "duck_hop", "at": [0.0, 0.0, 0.0] },
//!     { "kind": "object_revealer", "at": [0.0, -3.0, 1.0] }
//!   ],
//!   "clicks": [ { "tick": 10, "rig": 0 }, { "tick": 90, "rig": 0 } ],
//!   "deactivations": [ { "tick": 200, "rig": 1 } ]
//! }
//! ```

use std::path::Path;

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use glam::{Vec2, Vec3};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::components::mapposition::MapPosition;
use crate::error::ConfigError;
use crate::events::audio::AudioCmd;
use crate::events::rig::{Deactivate, GateChanged};
use crate::events::sequence::SequenceSignal;
use crate::resources::animconfig::AnimationConfig;
use crate::resources::audio::AudioBridge;
use crate::resources::pointer::PointerState;
use crate::resources::rng::AnimRng;
use crate::resources::worldtime::WorldTime;
use crate::rigs::RigKind;
use crate::systems::audio::{forward_audio_cmds, update_bevy_audio_cmds};
use crate::systems::click::{click_detector, click_gate_observer, settle_gate_observer};
use crate::systems::input::update_pointer_state;
use crate::systems::reststate::{arm_rigs, capture_rest_states, deactivate_observer};
use crate::systems::time::update_world_time;
use crate::systems::tween::tween_sequence_system;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRig {
    pub kind: RigKind,
    #[serde(default)]
    pub at: [f32; 3],
}

/// Scripted input targeting the rig at index `rig` of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedInput {
    pub tick: u64,
    pub rig: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub rigs: Vec<SceneRig>,
    #[serde(default)]
    pub clicks: Vec<ScriptedInput>,
    #[serde(default)]
    pub deactivations: Vec<ScriptedInput>,
}

impl Scene {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let scene = Self::from_json(&text)?;
        info!(
            "scene {} loaded: {} rigs",
            path.as_ref().display(),
            scene.rigs.len()
        );
        Ok(scene)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// One rig of every kind in a row.
    pub fn showcase() -> Self {
        let rigs = RigKind::ALL
            .iter()
            .enumerate()
            .map(|(i, &kind)| SceneRig {
                kind,
                at: [i as f32 * 6.0, 0.0, i as f32],
            })
            .collect::<Vec<_>>();
        let clicks = (0..rigs.len())
            .map(|rig| ScriptedInput {
                tick: 10 + rig as u64 * 5,
                rig,
            })
            .collect();
        Self {
            rigs,
            clicks,
            deactivations: Vec::new(),
        }
    }
}

/// Insert the resources and observers the click pipeline needs.
pub fn install(world: &mut World, config: AnimationConfig, rng: AnimRng) {
    world.insert_resource(WorldTime::default());
    world.insert_resource(PointerState::default());
    world.insert_resource(rng);
    world.insert_resource(config);
    world.init_resource::<Messages<AudioCmd>>();

    world.spawn(Observer::new(click_gate_observer));
    world.spawn(Observer::new(settle_gate_observer));
    world.spawn(Observer::new(deactivate_observer));
    world.spawn(Observer::new(log_gate_changes));
    world.spawn(Observer::new(log_sequence_signals));
    // Observers must exist before any system triggers.
    world.flush();
}

/// Systems run once per tick, in order.
pub fn build_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(
        (
            capture_rest_states,
            arm_rigs,
            click_detector,
            tween_sequence_system,
            forward_audio_cmds.run_if(resource_exists::<AudioBridge>),
            update_bevy_audio_cmds,
        )
            .chain(),
    );
    update
}

/// Spawn every rig of `scene`, tuned from the installed config.
pub fn spawn_scene(world: &mut World, scene: &Scene) -> Vec<Entity> {
    let config = world
        .get_resource::<AnimationConfig>()
        .cloned()
        .unwrap_or_default();
    scene
        .rigs
        .iter()
        .map(|rig| {
            let entity = rig.kind.spawn(world, Vec3::from(rig.at), &config);
            debug!("spawned {:?} rig {:?}", rig.kind, entity);
            entity
        })
        .collect()
}

/// Advance the world by one tick with the pointer at `pointer`.
pub fn tick(world: &mut World, schedule: &mut Schedule, dt: f32, pointer: Vec2, down: bool) {
    update_world_time(world, dt);
    update_pointer_state(world, pointer, down);
    schedule.run(world);
    world.clear_trackers();
}

/// Where to press to hit `rig`.
pub fn click_point(world: &World, rig: Entity) -> Option<Vec2> {
    world.get::<MapPosition>(rig).map(|p| p.pos.truncate())
}

/// Fire the scripted input of `scene` due at `tick`. Returns the pointer to
/// use for this tick, pressed if a click is due.
pub fn scripted_input(world: &mut World, scene: &Scene, rigs: &[Entity], tick: u64) -> (Vec2, bool) {
    for deactivation in scene.deactivations.iter().filter(|d| d.tick == tick) {
        if let Some(&entity) = rigs.get(deactivation.rig) {
            world.trigger(Deactivate { entity });
        }
    }
    let due = scene
        .clicks
        .iter()
        .filter(|c| c.tick == tick)
        .find_map(|c| rigs.get(c.rig).and_then(|&rig| click_point(world, rig)));
    match due {
        Some(point) => (point, true),
        None => (Vec2::splat(f32::MAX), false),
    }
}

fn log_gate_changes(trigger: On<GateChanged>) {
    let event = trigger.event();
    debug!("gate {:?} -> {:?}", event.entity, event.state);
}

fn log_sequence_signals(trigger: On<SequenceSignal>) {
    let event = trigger.event();
    info!("signal '{}' from {:?} (owner {:?})", event.signal, event.sequence, event.owner);
}
