//! Bundler configuration.
//!
//! Handles loading, validating, and merging `ipa-bundler.toml`. Values are
//! layered: stock defaults are overridden by the config file (if any), which
//! the CLI flags override in turn.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! dir = "."                        # Where the two files are written
//! html_file = "index.html"         # Install page fragment
//! manifest_file = "manifest.plist" # Installer manifest
//!
//! [html]
//! icon_size = 200                  # Inline icon width/height in CSS pixels
//!
//! [qr]
//! size = 150                       # Default QR image edge length for `qr`
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "ipa-bundler.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Bundler configuration loaded from `ipa-bundler.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundlerConfig {
    /// Output location and file names.
    pub output: OutputConfig,
    /// Install page rendering.
    pub html: HtmlConfig,
    /// QR link defaults.
    pub qr: QrConfig,
}

impl BundlerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.output.validate()?;
        if self.html.icon_size == 0 {
            return Err(ConfigError::Validation(
                "html.icon_size must be non-zero".into(),
            ));
        }
        if self.qr.size == 0 {
            return Err(ConfigError::Validation("qr.size must be non-zero".into()));
        }
        Ok(())
    }
}

/// Where the generated files go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory both files are written into.
    pub dir: PathBuf,
    /// File name of the install page fragment.
    pub html_file: String,
    /// File name of the installer manifest.
    pub manifest_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            html_file: "index.html".to_string(),
            manifest_file: "manifest.plist".to_string(),
        }
    }
}

impl OutputConfig {
    /// File names must be bare, non-empty and distinct, so a bundle always
    /// maps to exactly two files inside `dir`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, name) in [
            ("output.html_file", &self.html_file),
            ("output.manifest_file", &self.manifest_file),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
            if name.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a file name, not a path: {name}"
                )));
            }
        }
        if self.html_file == self.manifest_file {
            return Err(ConfigError::Validation(
                "output.html_file and output.manifest_file must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Install page rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HtmlConfig {
    /// Width and height of the inline icon.
    pub icon_size: u32,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            icon_size: crate::generate::DEFAULT_ICON_SIZE,
        }
    }
}

/// QR link settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrConfig {
    /// Edge length used by `qr` when no size argument is given.
    pub size: u32,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self { size: 150 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BundlerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<BundlerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BundlerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when it
/// does not exist.
pub fn load_config(path: &Path) -> Result<BundlerConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `ipa-bundler.toml`.
///
/// Used by `ipa-bundler --gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# ipa-bundler configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Directory the install page and manifest are written into.
dir = "."

# File name of the install page fragment (an <a> element).
html_file = "index.html"

# File name of the installer manifest. The install link points at it, so it
# must be served next to the HTML file (or pass --base-url).
manifest_file = "manifest.plist"

# ---------------------------------------------------------------------------
# Install page
# ---------------------------------------------------------------------------
[html]
# Width and height of the inline app icon, in CSS pixels.
icon_size = 200

# ---------------------------------------------------------------------------
# QR links
# ---------------------------------------------------------------------------
[qr]
# Edge length in pixels used by `qr` when no size argument is given.
size = 150
"##
}
