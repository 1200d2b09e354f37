use bevy_ecs::prelude::Resource;

/// Random source for shuffled reveals and randomized idle loops.
///
/// Seed it with [`AnimRng::seeded`] for reproducible runs.
#[derive(Resource, Debug, Clone)]
pub struct AnimRng(pub fastrand::Rng);

impl AnimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }
}

impl Default for AnimRng {
    fn default() -> Self {
        Self(fastrand::Rng::new())
    }
}
