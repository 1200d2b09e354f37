//! ECS resource bridging the main thread with the background audio host.
//!
//! Use [`setup_audio`] once during initialization to spawn the host thread
//! and insert the [`AudioBridge`] and `Messages<AudioCmd>` resources. Call
//! [`shutdown_audio`] during teardown to stop the thread.

use crate::events::audio::AudioCmd;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Shared bridge between the ECS world and the audio host.
#[derive(Resource)]
pub struct AudioBridge {
    /// Sender for [`AudioCmd`] messages (ECS -> audio host).
    pub tx_cmd: Sender<AudioCmd>,
    /// Join handle for the background thread.
    pub handle: Option<std::thread::JoinHandle<()>>,
}

/// Spawn `host` on its own thread and register the bridge resources.
///
/// The host receives every forwarded command and should return after
/// [`AudioCmd::Shutdown`] or when the channel disconnects.
pub fn setup_audio<F>(world: &mut World, host: F)
where
    F: FnOnce(Receiver<AudioCmd>) + Send + 'static,
{
    let (tx_cmd, rx_cmd) = unbounded::<AudioCmd>();
    let handle = std::thread::spawn(move || host(rx_cmd));

    world.insert_resource(AudioBridge {
        tx_cmd,
        handle: Some(handle),
    });
    world.init_resource::<Messages<AudioCmd>>();
}

/// Request shutdown of the audio host and join it.
pub fn shutdown_audio(world: &mut World) {
    if let Some(mut bridge) = world.remove_resource::<AudioBridge>() {
        let _ = bridge.tx_cmd.send(AudioCmd::Shutdown);
        if let Some(handle) = bridge.handle.take() {
            let _ = handle.join();
        }
    }
}
