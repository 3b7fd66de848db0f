use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use formats::RegionColumns;
use serde::{Deserialize, Serialize};
use session::{LayoutConfig, PlaybackConfig, SessionConfig};
use tracing::info;

pub const CONFIG_ENV: &str = "BEESWARM_CONFIG";

/// Viewer settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: f64,
    pub height: f64,
    pub layout: LayoutConfig,
    pub playback: PlaybackConfig,
    pub region_columns: RegionColumns,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            width: session.width,
            height: session.height,
            layout: session.layout,
            playback: session.playback,
            region_columns: RegionColumns::default(),
        }
    }
}

impl ViewerConfig {
    /// Reads `explicit`, else the file named by `BEESWARM_CONFIG`, else
    /// falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "loaded viewer config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            width: self.width,
            height: self.height,
            layout: self.layout.clone(),
            playback: self.playback,
        }
    }
}
