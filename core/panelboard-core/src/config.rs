//! Panel configuration loading and saving.
//!
//! Embedders usually ship a panel layout file next to their own settings;
//! loading degrades to defaults on a missing or corrupt file so a bad
//! config never takes the board down with it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use panelboard_host::DisplaySlot;

use crate::error::{BoardError, Result};

/// Settings a `Panel` is opened with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Code name of the objective the panel renders on.
    pub objective: String,
    #[serde(default = "default_criterion")]
    pub criterion: String,
    #[serde(default = "default_display_slot")]
    pub display_slot: DisplaySlot,
    /// Both water marks start here; top fields grow upward from it and
    /// bottom fields downward.
    #[serde(default)]
    pub start_mark: i32,
}

fn default_criterion() -> String {
    "dummy".to_string()
}

fn default_display_slot() -> DisplaySlot {
    DisplaySlot::SideBar
}

impl Default for PanelConfig {
    fn default() -> Self {
        PanelConfig {
            objective: "panel".to_string(),
            criterion: default_criterion(),
            display_slot: default_display_slot(),
            start_mark: 0,
        }
    }
}

/// Loads a panel configuration, returning defaults if the file is missing
/// or unreadable.
pub fn load_panel_config(path: &Path) -> PanelConfig {
    fs_err::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

/// Saves a panel configuration as pretty-printed JSON.
pub fn save_panel_config(path: &Path, config: &PanelConfig) -> Result<()> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|source| BoardError::ConfigSerialize { source })?;
    fs_err::write(path, content).map_err(|source| BoardError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    })
}
