//! Bundle orchestration: input → metadata → artifacts → files.
//!
//! ```text
//! BundleInput ─normalize─▶ BundleOptions ─┬─ Direct ───────────────┬─▶ render ─▶ Artifacts ─▶ write
//!                                         └─ PackageFile ─ resolve ┘
//!                                            backend, introspect
//! ```
//!
//! Every step runs in sequence and the first failure ends the run. Writes are
//! not transactional: if the second file fails, the first stays on disk.

use crate::config::{BundlerConfig, ConfigError, OutputConfig};
use crate::generate::{manifest, render_html};
use crate::introspect::{self, IntrospectError, PackageBackend};
use crate::options::{BundleInput, BundleOptions, normalize};
use crate::types::{Artifacts, InstallMetadata, PackageSource, check_manifest_text};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error(
        "reading package files requires the optional `{feature}` feature (zip and plist support); rebuild ipa-bundler with `--features {feature}` or pass the app metadata directly"
    )]
    CapabilityUnavailable { feature: &'static str },
    #[error(transparent)]
    Introspect(#[from] IntrospectError),
    #[error("missing required app metadata: {0}")]
    MissingField(&'static str),
    #[error("{field} contains {ch:?}, which cannot appear in the manifest")]
    InvalidCharacter { field: &'static str, ch: char },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one bundling run, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// The resolved app identity the artifacts were rendered from.
    pub metadata: InstallMetadata,
    pub output: OutputConfig,
    pub artifacts: Artifacts,
}

/// Render both artifacts for `input` with stock settings.
pub fn create_bundle(input: BundleInput) -> Result<Artifacts, BundleError> {
    let bundle = build_bundle(input, &BundlerConfig::default(), introspect::resolve_backend)?;
    Ok(bundle.artifacts)
}

/// Render both artifacts for `input` and write them to the output directory.
///
/// Returns the paths written, HTML first.
pub fn write_bundle(input: BundleInput) -> Result<Vec<PathBuf>, BundleError> {
    let bundle = build_bundle(input, &BundlerConfig::default(), introspect::resolve_backend)?;
    write_outputs(&bundle)
}

/// Normalize `input` against `config`, resolve its metadata and render.
///
/// `resolve` is only called in package-file mode, and before the package is
/// opened.
pub fn build_bundle<F>(
    input: BundleInput,
    config: &BundlerConfig,
    resolve: F,
) -> Result<Bundle, BundleError>
where
    F: FnOnce() -> Result<Box<dyn PackageBackend>, BundleError>,
{
    let options = normalize(input, &config.output);
    options.output.validate()?;

    let metadata = match &options.source {
        PackageSource::Direct(metadata) => metadata.clone(),
        PackageSource::PackageFile(path) => {
            let backend = resolve()?;
            introspect::introspect(path, backend.as_ref())?
        }
    };
    metadata.validate()?;
    check_manifest_text("installUrl", &options.install_url)?;

    let artifacts = render_artifacts(&options, &metadata, config.html.icon_size);
    Ok(Bundle {
        metadata,
        output: options.output,
        artifacts,
    })
}

/// Key the two rendered documents by their configured file names.
pub fn render_artifacts(
    options: &BundleOptions,
    metadata: &InstallMetadata,
    icon_size: u32,
) -> Artifacts {
    let mut artifacts = Artifacts::new();
    artifacts.insert(
        options.output.html_file.clone(),
        render_html(&options.manifest_url, metadata, icon_size).into_string(),
    );
    artifacts.insert(
        options.output.manifest_file.clone(),
        manifest(&options.install_url, metadata),
    );
    artifacts
}

/// Write a bundle's artifacts, HTML first then manifest.
pub fn write_outputs(bundle: &Bundle) -> Result<Vec<PathBuf>, BundleError> {
    let order = [&bundle.output.html_file, &bundle.output.manifest_file];
    let mut written = Vec::with_capacity(order.len());
    fs::create_dir_all(&bundle.output.dir)?;
    for name in order {
        if let Some(content) = bundle.artifacts.get(name) {
            written.push(write_artifact(&bundle.output.dir, name, content)?);
        }
    }
    Ok(written)
}

fn write_artifact(dir: &Path, name: &str, content: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}
