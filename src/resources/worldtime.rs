use bevy_ecs::prelude::Resource;

/// Simulation clock advanced once per tick by
/// [`update_world_time`](crate::systems::time::update_world_time).
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WorldTime {
    /// Scaled seconds since the world started.
    pub elapsed: f32,
    /// Scaled step of the current tick. Sequences advance by exactly this much.
    pub delta: f32,
    /// Multiplier applied to every host delta; `0.0` freezes playback.
    pub time_scale: f32,
    /// Ticks run so far.
    pub ticks: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            ticks: 0,
        }
    }
}
