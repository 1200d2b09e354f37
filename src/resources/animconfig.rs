//! Animation tunables resource.
//!
//! Durations, distances and angles of every rig can be overridden from an
//! INI file. Sections are named after the rig kind, keys after the tunable.
//! Anything missing keeps the built-in default.
//!
//! # Configuration File Format
//!
//! ```ini
//! [sun_girl]
//! appear_duration = 0.5
//! arm_rotation_angle = 25
//!
//! [object_revealer]
//! delay_between = 0.2
//! pop_sound = pop
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use rustc_hash::FxHashMap;

use crate::error::ConfigError;

#[derive(Resource, Debug, Clone, Default)]
pub struct AnimationConfig {
    sections: FxHashMap<String, FxHashMap<String, String>>,
    /// File the values were read from, if any.
    pub config_path: Option<PathBuf>,
}

type RawIni = std::collections::HashMap<String, std::collections::HashMap<String, Option<String>>>;

impl AnimationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_raw(raw: RawIni) -> Self {
        let sections = raw
            .into_iter()
            .map(|(section, keys)| {
                let keys = keys
                    .into_iter()
                    .filter_map(|(k, v)| v.map(|v| (k, v)))
                    .collect();
                (section, keys)
            })
            .collect();
        Self {
            sections,
            config_path: None,
        }
    }

    /// Load tunables from an INI file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = Ini::new().load(path).map_err(|reason| ConfigError::Load {
            path: path.display().to_string(),
            reason,
        })?;
        let mut config = Self::from_raw(raw);
        config.config_path = Some(path.to_path_buf());
        info!(
            "Loaded animation config from {:?}: {} section(s)",
            path,
            config.sections.len()
        );
        Ok(config)
    }

    /// Parse tunables from INI text.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let raw = Ini::new()
            .read(text.to_owned())
            .map_err(|reason| ConfigError::Load {
                path: "<inline>".to_owned(),
                reason,
            })?;
        Ok(Self::from_raw(raw))
    }

    /// Raw value. Section and key lookups are case-insensitive.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_lowercase())?
            .get(&key.to_lowercase())
            .map(String::as_str)
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_lowercase())
            .or_default()
            .insert(key.to_lowercase(), value.into());
    }

    /// Parsed value, or `None` if absent. Unparsable values are reported.
    pub fn parse<T: FromStr>(&self, section: &str, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(section, key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| ConfigError::Invalid {
                    section: section.to_owned(),
                    key: key.to_owned(),
                    value: raw.to_owned(),
                }),
        }
    }

    fn or_default<T: FromStr>(&self, section: &str, key: &str, default: T) -> T {
        match self.parse(section, key) {
            Ok(Some(v)) => v,
            Ok(None) => default,
            Err(err) => {
                warn!("{}, using default", err);
                default
            }
        }
    }

    pub fn f32_or(&self, section: &str, key: &str, default: f32) -> f32 {
        self.or_default(section, key, default)
    }

    pub fn i32_or(&self, section: &str, key: &str, default: i32) -> i32 {
        self.or_default(section, key, default)
    }

    pub fn string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key).unwrap_or(default).to_owned()
    }
}
