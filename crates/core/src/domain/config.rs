//! Preset persistence for the parameter surface
//!
//! A preset is a named set of parameter values, stored as TOML. Presets
//! are a control-path convenience: loading and applying them never
//! touches the audio thread beyond ordinary lock-free parameter writes.
//!
//! Missing keys leave the store at its defaults; unknown keys are
//! rejected so a typo in a hand-edited file fails loudly instead of
//! silently doing nothing.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::params::{ParamId, ParamStore};

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during preset operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}

/// A named snapshot of parameter values
///
/// Keys are the stable snake_case parameter keys; a sparse map is valid
/// and only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,

    #[serde(default)]
    pub params: BTreeMap<String, f32>,
}

impl Preset {
    /// Capture the store's current (clamped) values under a name.
    pub fn from_store(name: impl Into<String>, store: &ParamStore) -> Self {
        let params = ParamId::ALL
            .iter()
            .map(|id| (id.key().to_string(), store.get(*id)))
            .collect();
        Self {
            name: name.into(),
            params,
        }
    }

    /// Write every named value into the store.
    ///
    /// Values are stored raw; the store clamps on read, so an
    /// out-of-range preset value degrades to the range edge rather than
    /// failing. An unknown key is an error and nothing is applied.
    pub fn apply(&self, store: &ParamStore) -> Result<()> {
        // Validate before mutating so a bad preset is all-or-nothing
        let mut resolved = Vec::with_capacity(self.params.len());
        for (key, value) in &self.params {
            let id = ParamId::from_key(key)
                .ok_or_else(|| ConfigError::UnknownParameter(key.clone()))?;
            resolved.push((id, *value));
        }
        for (id, value) in resolved {
            store.set(id, value);
        }
        debug!("applied preset '{}' ({} values)", self.name, self.params.len());
        Ok(())
    }

    /// Load a preset from a TOML file.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Save the preset as TOML.
    pub fn save_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
