// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[output]` - Default output directory, renderer and scale
//! - `[raster]` - In-process renderer tuning (sizing policy, pixel budget, fonts)
//! - `[thumbnail]` - External thumbnail tool (program path, timeout)
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Pass a directory to `load_with_override()` (the `--config-dir` flag)
//! 3. Set `SVGSCALE_CONFIG_DIR` environment variable
//! 4. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use svgscale::config::{self, RendererKind};
//! use std::path::PathBuf;
//!
//! // Load existing configuration (returns tuple with optional warning)
//! let (mut config, _warning) = config::load();
//!
//! // Modify a setting
//! config.output.directory = Some(PathBuf::from("/tmp/png"));
//! config.output.renderer = Some(RendererKind::Raster);
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::domain::ScaleFactor;
use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Enums (shared between sections)
// =============================================================================

/// Which conversion strategy to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RendererKind {
    /// Rewrite the root viewport and rasterize in-process.
    #[default]
    Raster,
    /// Delegate to the OS thumbnail utility.
    Thumbnail,
}

impl RendererKind {
    /// Parses the names accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "raster" | "dom" => Some(RendererKind::Raster),
            "thumbnail" | "qlmanage" => Some(RendererKind::Thumbnail),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RendererKind::Raster => "raster",
            RendererKind::Thumbnail => "thumbnail",
        }
    }
}

/// How the raster renderer sizes an SVG whose root lacks `width`/`height`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SizingPolicy {
    /// Fall back to 300x150.
    #[default]
    DefaultViewport,
    /// Use the `viewBox` size when present, then 300x150.
    ViewBox,
}

// =============================================================================
// Section Structs
// =============================================================================

/// Where and how converted files are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OutputConfig {
    /// Directory receiving `<name>-<scale>x.png` files. Also the directory
    /// listed by `svgscale list`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Conversion strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<RendererKind>,

    /// Scale used when `--scale` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scale: Option<ScaleFactor>,
}

/// In-process renderer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RasterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<SizingPolicy>,

    /// Largest surface, in pixels, the renderer may allocate.
    #[serde(default = "default_max_pixels", skip_serializing_if = "Option::is_none")]
    pub max_pixels: Option<u64>,

    /// Load installed fonts so `<text>` elements render.
    #[serde(
        default = "default_load_system_fonts",
        skip_serializing_if = "Option::is_none"
    )]
    pub load_system_fonts: Option<bool>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            sizing: Some(SizingPolicy::default()),
            max_pixels: default_max_pixels(),
            load_system_fonts: default_load_system_fonts(),
        }
    }
}

/// External thumbnail tool settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ThumbnailConfig {
    /// Program invoked as `<program> -t -s <px> -o <dir> <input>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,

    /// Kill the tool after this many seconds. Unset means wait forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Application configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub raster: RasterConfig,

    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
}

impl Config {
    /// Output directory, falling back to the platform pictures directory.
    pub fn output_directory(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(paths::default_output_dir)
    }

    #[must_use]
    pub fn renderer(&self) -> RendererKind {
        self.output.renderer.unwrap_or_default()
    }

    #[must_use]
    pub fn default_scale(&self) -> ScaleFactor {
        self.output.default_scale.unwrap_or_default()
    }

    #[must_use]
    pub fn sizing(&self) -> SizingPolicy {
        self.raster.sizing.unwrap_or_default()
    }

    #[must_use]
    pub fn max_pixels(&self) -> u64 {
        self.raster
            .max_pixels
            .unwrap_or(DEFAULT_MAX_PIXELS)
            .max(MIN_MAX_PIXELS)
    }

    #[must_use]
    pub fn load_system_fonts(&self) -> bool {
        self.raster.load_system_fonts.unwrap_or(true)
    }

    pub fn thumbnail_program(&self) -> PathBuf {
        self.thumbnail
            .program
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_THUMBNAIL_PROGRAM))
    }

    #[must_use]
    pub fn thumbnail_timeout(&self) -> Option<Duration> {
        self.thumbnail.timeout_secs.map(Duration::from_secs)
    }
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_max_pixels() -> Option<u64> {
    Some(DEFAULT_MAX_PIXELS)
}

fn default_load_system_fonts() -> Option<bool> {
    Some(true)
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = paths::get_config_file_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    return (
                        Config::default(),
                        Some(format!(
                            "ignoring {}: {err}; using default settings",
                            path.display()
                        )),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = paths::get_config_file_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Err(Error::Config("no config directory available".into()))
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("cannot create {}: {e}", parent.display())))?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)
        .map_err(|e| Error::Config(format!("cannot write {}: {e}", path.display())))?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
