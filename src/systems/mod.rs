//! ECS systems and observers.
//!
//! Submodules overview:
//! - [`audio`] – forwarding of sound commands to the audio host
//! - [`click`] – pointer hit testing, click gate and settle observers
//! - [`input`] – pointer state update from the host
//! - [`reststate`] – rest snapshots, rig arming and deactivation
//! - [`reveal`] – shuffled, staggered reveal coordinator
//! - [`time`] – world time update
//! - [`tween`] – easing, sequence playback and the [`Tweens`](tween::Tweens) parameter
pub mod audio;
pub mod click;
pub mod input;
pub mod reststate;
pub mod reveal;
pub mod time;
pub mod tween;
