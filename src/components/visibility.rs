//! Activation markers.

use bevy_ecs::prelude::Component;

/// Entity is inactive: not drawn by the host and never hit by clicks.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Hidden;

/// Rig has rest snapshots for all its parts and its pre-click pose applied.
/// Only armed rigs accept clicks.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Armed;
