//! Bot configuration — bounds, defaults, and asset locations.
//!
//! Every field has a default, so the bot runs with no config at all.
//! `QUIP_CONFIG` names an optional JSON file overriding the defaults;
//! `QUIP_ASSETS` overrides the asset directory on top of either.

use quip_core::CanvasSize;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Root of the bundled assets (`fonts/`, `backgrounds/`).
    pub assets_dir: PathBuf,
    /// Logical font family (font file stem, case-insensitive).
    pub font_family: String,
    /// Initial font size in pixels; auto-fit steps down from here.
    pub font_size: f32,
    pub min_font_size: f32,
    pub font_size_step: f32,
    /// Canvas inset around the text block.
    pub padding: f32,
    /// Maximum caption length in characters.
    pub max_text_len: usize,
    /// Per-side canvas dimension bounds.
    pub min_canvas: u32,
    pub max_canvas: u32,
    pub default_canvas: CanvasSize,
    pub default_theme: String,
    /// Where the console driver writes reply images.
    pub out_dir: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            font_family: "dejavusans-bold".into(),
            font_size: 96.0,
            min_font_size: 28.0,
            font_size_step: 8.0,
            padding: 24.0,
            max_text_len: 280,
            min_canvas: 64,
            max_canvas: 2048,
            default_canvas: CanvasSize::new(1200, 630),
            default_theme: "classic".into(),
            out_dir: PathBuf::from("out"),
        }
    }
}

impl BotConfig {
    /// Load from `QUIP_CONFIG` (if set) and apply `QUIP_ASSETS`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os("QUIP_CONFIG") {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };
        if let Some(dir) = std::env::var_os("QUIP_ASSETS") {
            config.assets_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = serde_json::from_slice(&bytes)
            .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        log::info!("config loaded from {path:?}");
        Ok(config)
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.assets_dir.join("fonts")
    }

    pub fn backgrounds_dir(&self) -> PathBuf {
        self.assets_dir.join("backgrounds")
    }
}

// ===================================================================
// Tests
// ===================================================================
