//! ECS components for entities.
//!
//! This module groups all component types that can be attached to entities in
//! the scene. Components hold the animatable pose of an entity, the click
//! pipeline state of a rig and the running sequences.
//!
//! Submodules overview:
//! - [`clickgate`] – per-rig click state machine (one-shot, repeat, toggle)
//! - [`hitbox`] – axis-aligned click region relative to the entity position
//! - [`mapposition`] – world-space position (pivot) for an entity
//! - [`opacity`] – alpha of an entity's renderer
//! - [`reststate`] – pose snapshot taken before any animation touches an entity
//! - [`rig`] – named rig parts and the choreography a click plays
//! - [`rotation`] – rotation angle in degrees
//! - [`scale`] – scale factor per axis
//! - [`sequence`] – sequence builder and the player component running it
//! - [`tween`] – tween descriptions, easing curves and channel locks
//! - [`visibility`] – hidden and armed markers

pub mod clickgate;
pub mod hitbox;
pub mod mapposition;
pub mod opacity;
pub mod reststate;
pub mod rig;
pub mod rotation;
pub mod scale;
pub mod sequence;
pub mod tween;
pub mod visibility;
