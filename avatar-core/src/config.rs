//! Rig configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::drag::DragConfig;
use crate::gesture::GestureConfig;
use crate::store::DEFAULT_STORAGE_KEY;
use crate::RigResult;

/// Tunables for the rig. Every field has a default, so a partial JSON file
/// only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Tap/drag thresholds.
    pub gesture: GestureConfig,
    /// Drag rotation sensitivity.
    pub drag: DragConfig,
    /// Key the profile record is stored under.
    pub storage_key: String,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            drag: DragConfig::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl RigConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not valid configuration.
    pub fn from_json(json: &str) -> RigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> RigResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }
}
