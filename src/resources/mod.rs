//! ECS resources made available to systems.
//!
//! Overview
//! - `animconfig` – INI-backed tunables for every rig
//! - `audio` – bridge and channel for the background audio host
//! - `pointer` – per-tick pointer position and primary button state
//! - `rng` – random source for shuffles and randomized idle loops
//! - `worldtime` – simulation time and delta
pub mod animconfig;
pub mod audio;
pub mod pointer;
pub mod rng;
pub mod worldtime;
