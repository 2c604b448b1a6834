//! Caller input normalization.
//!
//! [`BundleInput`] is the loose shape callers fill in: every field is
//! optional, and metadata may be given directly or left to be read from a
//! package file. [`normalize`] turns it into [`BundleOptions`], where output
//! settings are complete and the metadata source is an explicit
//! [`PackageSource`]. Nothing is validated here; missing metadata is reported
//! once the source has been resolved.

use crate::config::OutputConfig;
use crate::types::{InstallMetadata, PackageSource};
use serde::Deserialize;
use std::path::PathBuf;

/// Raw bundling request.
///
/// Deserializes from JSON with camelCase keys, mirroring [`InstallMetadata`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BundleInput {
    /// Where the package bytes can be downloaded from.
    pub install_url: String,
    /// How the HTML page refers to the manifest. Defaults to the manifest
    /// file name, i.e. a sibling of the page.
    pub manifest_url: Option<String>,
    /// Read metadata from this package instead of the fields below.
    pub package_path: Option<String>,
    pub bundle_identifier: String,
    pub bundle_version: String,
    pub bundle_marketing_version: String,
    pub app_title: String,
    #[serde(skip)]
    pub app_icon: Option<Vec<u8>>,
    /// Output overrides; unset fields come from configuration.
    pub output_dir: Option<PathBuf>,
    pub html_file: Option<String>,
    pub manifest_file: Option<String>,
}

impl BundleInput {
    /// Input for direct-metadata mode.
    pub fn with_metadata(install_url: impl Into<String>, metadata: InstallMetadata) -> Self {
        Self {
            install_url: install_url.into(),
            bundle_identifier: metadata.bundle_identifier,
            bundle_version: metadata.bundle_version,
            bundle_marketing_version: metadata.bundle_marketing_version,
            app_title: metadata.app_title,
            app_icon: metadata.app_icon,
            ..Self::default()
        }
    }

    /// Input for package-file mode.
    pub fn with_package(install_url: impl Into<String>, package_path: impl Into<String>) -> Self {
        Self {
            install_url: install_url.into(),
            package_path: Some(package_path.into()),
            ..Self::default()
        }
    }
}

/// Fully-populated bundling request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOptions {
    pub install_url: String,
    pub manifest_url: String,
    pub source: PackageSource,
    pub output: OutputConfig,
}

/// Fill output settings from `defaults` and classify the metadata source.
///
/// Package-file mode applies exactly when `package_path` is a non-empty
/// string; anything else is direct mode, even if the metadata is blank.
pub fn normalize(input: BundleInput, defaults: &OutputConfig) -> BundleOptions {
    let output = OutputConfig {
        dir: input.output_dir.unwrap_or_else(|| defaults.dir.clone()),
        html_file: input
            .html_file
            .unwrap_or_else(|| defaults.html_file.clone()),
        manifest_file: input
            .manifest_file
            .unwrap_or_else(|| defaults.manifest_file.clone()),
    };

    let source = match input.package_path.filter(|p| !p.is_empty()) {
        Some(path) => PackageSource::PackageFile(PathBuf::from(path)),
        None => PackageSource::Direct(InstallMetadata {
            bundle_identifier: input.bundle_identifier,
            bundle_version: input.bundle_version,
            bundle_marketing_version: input.bundle_marketing_version,
            app_title: input.app_title,
            app_icon: input.app_icon,
        }),
    };

    BundleOptions {
        install_url: input.install_url,
        manifest_url: input
            .manifest_url
            .unwrap_or_else(|| output.manifest_file.clone()),
        source,
        output,
    }
}

/// Append a file name to a base URL with exactly one `/` between them.
pub fn join_url(base: &str, name: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        name.trim_start_matches('/')
    )
}
