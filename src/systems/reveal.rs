//! Randomized ordering of reveals.

use bevy_ecs::prelude::Entity;
use log::debug;

use crate::components::sequence::{Action, SequenceSpec};

/// A uniformly random permutation of `items` (Fisher-Yates).
pub fn shuffled<T: Clone>(items: &[T], rng: &mut fastrand::Rng) -> Vec<T> {
    let mut out = items.to_vec();
    rng.shuffle(&mut out);
    out
}

/// Coordinator sequence revealing `entities` one by one in random order.
///
/// The reveal of the `i`-th entity in the permuted order starts at
/// `i * per_item_delay` as an independent sequence, so looping steps inside a
/// reveal never hold the coordinator back. Entities `reveal` returns `None`
/// for are skipped but still use up their slot. The coordinator completes
/// `per_item_delay` after the last slot.
///
/// Slots are anchored: each one is measured from the tick the previous slot
/// actually fired on, so two reveals are never less than `per_item_delay`
/// apart.
pub fn reveal_in_random_order(
    entities: &[Entity],
    per_item_delay: f32,
    rng: &mut fastrand::Rng,
    mut reveal: impl FnMut(Entity) -> Option<SequenceSpec>,
) -> SequenceSpec {
    let mut spec = SequenceSpec::new().anchor_calls();
    for entity in shuffled(entities, rng) {
        match reveal(entity) {
            Some(item) => spec = spec.append_call(Action::play(item)),
            None => debug!("reveal of {:?} skipped", entity),
        }
        spec = spec.append_interval(per_item_delay);
    }
    spec
}
