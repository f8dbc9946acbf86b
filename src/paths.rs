// SPDX-License-Identifier: MPL-2.0
//! Path management for the settings file and the default output directory.
//!
//! # Path Resolution Order
//!
//! The config directory is resolved in the following priority order:
//! 1. **Explicit override** - the `--config-dir` CLI argument, or a test path
//! 2. **Environment variable** (`SVGSCALE_CONFIG_DIR`)
//! 3. **Platform default** - via `dirs` crate
//!
//! Nothing is stored in process-wide state: callers pass the override in.

use std::path::PathBuf;

/// Application name used for directory naming.
const APP_NAME: &str = "svgscale";

/// Name of the settings file inside the config directory.
pub const CONFIG_FILE: &str = "settings.toml";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "SVGSCALE_CONFIG_DIR";

/// Returns the application config directory path with an optional override.
///
/// - Linux: `~/.config/svgscale/`
/// - macOS: `~/Library/Application Support/svgscale/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\svgscale\`
///
/// # Resolution Order
///
/// 1. `override_path` parameter (if `Some`)
/// 2. `SVGSCALE_CONFIG_DIR` environment variable (if set and non-empty)
/// 3. Platform-specific config directory (with app name appended)
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_DIR) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

/// Returns the full path of `settings.toml` with an optional directory override.
pub fn get_config_file_with_override(override_dir: Option<PathBuf>) -> Option<PathBuf> {
    get_app_config_dir_with_override(override_dir).map(|dir| dir.join(CONFIG_FILE))
}

/// Output directory used when the settings do not name one.
///
/// The user's pictures directory, or the current directory when the platform
/// has none.
pub fn default_output_dir() -> PathBuf {
    dirs::picture_dir().unwrap_or_else(|| PathBuf::from("."))
}
