//! TOML settings for the command-line front end.
//!
//! ```toml
//! [engine]
//! all_small = true
//! row_retirement = false
//! ruleset = "per_component_top"   # or "global_top"
//!
//! [cgt]
//! depth = 5
//! max_lines = 300
//! show_grundy = true
//!
//! [explore]
//! repeats = 500
//! ```

use std::path::Path;

use derive_more::{Display, Error};
use mosaic_core::EngineConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::cgt::CgtConfig;

/// Failure to read or parse a settings file.
#[derive(Debug, Clone, Display, Error)]
#[display("settings error: {message}")]
pub struct SettingsError {
    pub message: String,
}

/// Explore-mode settings.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExploreSettings {
    /// Playouts per explore run.
    pub repeats: u32,
}

impl Default for ExploreSettings {
    fn default() -> Self {
        ExploreSettings { repeats: 200 }
    }
}

/// Everything a settings file may set. Missing sections take their defaults.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub cgt: CgtConfig,
    pub explore: ExploreSettings,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Settings, SettingsError> {
        toml::from_str(text).map_err(|e| SettingsError {
            message: format!("failed to parse settings: {}", e),
        })
    }

    /// Loads settings from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
        debug!("Loading settings from file");
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| SettingsError {
            message: format!("failed to read settings file: {}", e),
        })?;
        let settings = Self::from_toml(&text)?;
        info!(
            all_small = settings.engine.all_small,
            depth = settings.cgt.depth(),
            "Settings loaded"
        );
        Ok(settings)
    }
}
