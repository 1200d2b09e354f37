//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per tick, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Start a new tick lasting `dt` unscaled seconds. Negative deltas count as zero.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let step = dt.max(0.0) * wt.time_scale.max(0.0);
    wt.delta = step;
    wt.elapsed += step;
    wt.ticks += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_scale_applies_to_delta() {
        let mut world = World::new();
        world.insert_resource(WorldTime {
            time_scale: 0.5,
            ..Default::default()
        });
        update_world_time(&mut world, 0.2);
        update_world_time(&mut world, -1.0);
        let wt = world.resource::<WorldTime>();
        assert!((wt.elapsed - 0.1).abs() < 1e-6);
        assert_eq!(wt.delta, 0.0);
        assert_eq!(wt.ticks, 2);
    }
}
