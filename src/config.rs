//! Render configuration parsed from JSON.
//!
//! Every field has a default, so `{}` is a valid config document and a host
//! may override only the colors it cares about.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CanvasError;
use crate::style::{KindPairExclusion, StatusColors};

/// Environment variable the CLI reads a config path from.
pub const CONFIG_PATH_ENV: &str = "TOPOLOGY_CANVAS_CONFIG";

/// Colors and fonts used by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub grid: String,
    pub node_border: String,
    pub selected_border: String,
    pub hovered_border: String,
    pub connection: String,
    pub bus_connection: String,
    pub text: String,
    pub status_outline: String,
    pub status_marker: String,
    /// Font for node names and bus names.
    pub font: String,
    /// Font for interface label badges.
    pub label_font: String,
    pub status: StatusColors,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            grid: "rgba(0, 0, 0, 0.06)".into(),
            node_border: "#4B5563".into(),
            selected_border: "#1E90FF".into(),
            hovered_border: "#F59E0B".into(),
            connection: "#6B7280".into(),
            bus_connection: "#9CA3AF".into(),
            text: "#1F2937".into(),
            status_outline: "#FFFFFF".into(),
            status_marker: "#FFFFFF".into(),
            font: "12px sans-serif".into(),
            label_font: "10px sans-serif".into(),
            status: StatusColors::default(),
        }
    }
}

/// Top-level config document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub theme: Theme,
    /// Node-kind pairs whose connections never get a visual line.
    pub excluded_kind_pairs: Vec<(String, String)>,
}

impl CanvasConfig {
    /// Parse a config document.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Io`] if the file cannot be read, or
    /// [`CanvasError::Json`] if it is malformed.
    pub fn from_path(path: &Path) -> Result<Self, CanvasError> {
        let json = std::fs::read_to_string(path)
            .map_err(|source| CanvasError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&json)
    }

    /// The link filter described by `excluded_kind_pairs`.
    #[must_use]
    pub fn link_filter(&self) -> KindPairExclusion {
        KindPairExclusion::new(self.excluded_kind_pairs.iter().cloned())
    }
}
