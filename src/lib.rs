//! Click-reveal animation library.
//!
//! This module exposes the ECS components, resources, systems, events and
//! rig choreographies for use in integration tests and by the scene runner.

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod resources;
pub mod rigs;
pub mod systems;
pub mod timeline;
