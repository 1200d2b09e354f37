//! Event types used by the engine.
//!
//! Events decouple the click pipeline from the animation runtime: the pointer
//! system only knows that a rig was clicked, the gate observer only knows that
//! a sequence finished.
//!
//! Submodules:
//! - [`audio`] – commands for the background audio host
//! - [`click`] – clicks that landed on a rig's hit box
//! - [`rig`] – rig deactivation and gate transitions
//! - [`sequence`] – sequence completion and emitted signals
pub mod audio;
pub mod click;
pub mod rig;
pub mod sequence;
