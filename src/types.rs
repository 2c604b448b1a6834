//! Shared types used across the bundling pipeline.
//!
//! [`InstallMetadata`] is the only shape the artifact builders ever see. How it
//! was obtained (typed in by the caller or read out of a package) is recorded
//! by [`PackageSource`] and resolved before rendering starts.

use crate::bundle::BundleError;
use crate::generate::is_xml_char;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Output file name → generated document text.
///
/// A bundle always has exactly two entries: the HTML page and the manifest.
pub type Artifacts = BTreeMap<String, String>;

/// Identity of the app being installed.
///
/// Deserializes from JSON with camelCase or snake_case keys:
///
/// ```json
/// {"bundleIdentifier": "com.example.app", "bundleVersion": "42",
///  "bundleMarketingVersion": "1.2.0", "appTitle": "Example"}
/// ```
///
/// The icon is never part of the JSON form; it is attached separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct InstallMetadata {
    /// Reverse-domain identifier (`CFBundleIdentifier`).
    #[serde(alias = "bundle_identifier")]
    pub bundle_identifier: String,
    /// Build number (`CFBundleVersion`).
    #[serde(alias = "bundle_version")]
    pub bundle_version: String,
    /// User-facing version (`CFBundleShortVersionString`). May be empty.
    #[serde(alias = "bundle_marketing_version")]
    pub bundle_marketing_version: String,
    /// Name shown on the install page and by the device installer.
    #[serde(alias = "app_title")]
    pub app_title: String,
    /// Raw icon file bytes, passed through untouched.
    #[serde(skip)]
    pub app_icon: Option<Vec<u8>>,
}

impl InstallMetadata {
    /// Check the fields the manifest cannot do without.
    ///
    /// Empty or whitespace-only identifier, build version or title is an
    /// error; the marketing version may be blank. The three manifest fields
    /// must also be representable in XML.
    pub fn validate(&self) -> Result<(), BundleError> {
        let required = [
            ("bundleIdentifier", &self.bundle_identifier),
            ("bundleVersion", &self.bundle_version),
            ("appTitle", &self.app_title),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(BundleError::MissingField(name));
            }
            check_manifest_text(name, value)?;
        }
        Ok(())
    }
}

/// Reject characters that XML 1.0 cannot represent, even escaped.
pub fn check_manifest_text(field: &'static str, value: &str) -> Result<(), BundleError> {
    match value.chars().find(|&c| !is_xml_char(c)) {
        Some(ch) => Err(BundleError::InvalidCharacter { field, ch }),
        None => Ok(()),
    }
}

/// Where the app identity comes from for one bundling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// The caller supplied the metadata directly.
    Direct(InstallMetadata),
    /// The metadata must be read out of this package file.
    PackageFile(PathBuf),
}
