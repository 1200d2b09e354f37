//! Audio plumbing between the ECS world and the audio host thread.
//!
//! - [`forward_audio_cmds`] drains [`AudioCmd`] messages written during the
//!   tick into the [`AudioBridge`] channel
//! - [`update_bevy_audio_cmds`] advances the message queue
//! - [`log_audio_host`] is a host that only logs what it would play, used by
//!   the headless demo
//!
//! The host owns the audio device; the world never blocks on it.

use crate::events::audio::AudioCmd;
use crate::resources::audio::AudioBridge;
use bevy_ecs::prelude::{MessageReader, Messages, Res, ResMut};
use crossbeam_channel::Receiver;
use log::info;

/// Forward ECS AudioCmd messages to the audio host via the AudioBridge sender.
pub fn forward_audio_cmds(bridge: Res<AudioBridge>, mut reader: MessageReader<AudioCmd>) {
    for cmd in reader.read() {
        // Ignore send error on shutdown.
        let _ = bridge.tx_cmd.send(cmd.clone());
    }
}

/// Advance the ECS message queue for AudioCmd so same-tick readers can observe writes.
pub fn update_bevy_audio_cmds(mut msgs: ResMut<Messages<AudioCmd>>) {
    msgs.update();
}

/// Audio host that logs sound effects instead of playing them.
pub fn log_audio_host(rx_cmd: Receiver<AudioCmd>) {
    let mut played = 0usize;
    while let Ok(cmd) = rx_cmd.recv() {
        match cmd {
            AudioCmd::PlayFx { id } => {
                played += 1;
                info!("audio: play fx '{}'", id);
            }
            AudioCmd::Shutdown => break,
        }
    }
    info!("audio host stopped after {} effect(s)", played);
}
