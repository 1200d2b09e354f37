use bevy_ecs::message::Message;

/// Commands sent *to* the audio host thread.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub enum AudioCmd {
    /// Play a one-shot sound effect by id. Unknown ids are ignored by the host.
    PlayFx { id: String },
    Shutdown,
}
