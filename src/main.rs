//! Headless scene runner for click-reveal rigs.
//!
//! Loads tunables from an INI file and a scene from JSON (or uses the
//! built-in showcase), then steps the world at a fixed delta while feeding
//! the scene's scripted clicks. Sound effects are logged by a background
//! audio host.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --config assets/animation.ini --scene assets/scene.json --ticks 600
//! ```

use std::path::PathBuf;

use clap::Parser;

use clickreveal::components::clickgate::ClickGate;
use clickreveal::game::{self, Scene};
use clickreveal::resources::animconfig::AnimationConfig;
use clickreveal::resources::audio::{setup_audio, shutdown_audio};
use clickreveal::resources::rng::AnimRng;
use clickreveal::resources::worldtime::WorldTime;
use clickreveal::systems::audio::log_audio_host;

/// Click-reveal rig runner
#[derive(Parser)]
#[command(version, about = "Steps click-triggered rig animations headlessly")]
struct Cli {
    /// INI file with per-rig tunables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON scene file. Without it every rig kind is spawned and clicked once.
    #[arg(long, value_name = "PATH")]
    scene: Option<PathBuf>,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seconds per tick.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Seed for shuffles and randomized idle loops.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match AnimationConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => AnimationConfig::new(),
    };

    let scene = match &cli.scene {
        Some(path) => match Scene::load_from_file(path) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Scene::showcase(),
    };

    let rng = cli.seed.map(AnimRng::seeded).unwrap_or_default();

    // --------------- ECS world + resources ---------------
    let mut world = bevy_ecs::world::World::new();
    setup_audio(&mut world, log_audio_host);
    game::install(&mut world, config, rng);
    let rigs = game::spawn_scene(&mut world, &scene);
    let mut update = game::build_schedule();

    // --------------- Main loop ---------------
    for tick in 0..cli.ticks {
        let (pointer, down) = game::scripted_input(&mut world, &scene, &rigs, tick);
        game::tick(&mut world, &mut update, cli.dt, pointer, down);
    }

    let clock = *world.resource::<WorldTime>();
    log::info!("ran {} ticks, {:.2}s simulated", clock.ticks, clock.elapsed);
    for (i, &rig) in rigs.iter().enumerate() {
        if let Some(gate) = world.get::<ClickGate>(rig) {
            log::info!("rig {} {:?}: {:?}", i, scene.rigs[i].kind, gate.state);
        }
    }
    shutdown_audio(&mut world);
}
