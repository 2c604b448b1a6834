//! Package backend traits and shared types.
//!
//! A [`PackageBackend`] opens package files; the resulting [`PackageHandle`]
//! answers the two questions the bundler asks of a package: what is its
//! identity, and what does its icon look like. The production implementation
//! is [`IpaBackend`](super::ipa::IpaBackend), compiled in with the `ipa`
//! feature.

use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntrospectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid package archive: {0}")]
    Archive(String),
    #[error("invalid Info.plist: {0}")]
    Plist(String),
    #[error("no Payload/<App>.app/Info.plist found in package")]
    MissingInfoPlist,
    #[error("Info.plist has no {0}")]
    MissingKey(&'static str),
}

/// Identity fields read from a package's Info.plist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    /// `CFBundleIdentifier`
    pub identifier: String,
    /// `CFBundleVersion`
    pub version: String,
    /// `CFBundleShortVersionString`, empty when absent.
    pub marketing_version: String,
    /// `CFBundleDisplayName`
    pub display_name: Option<String>,
    /// `CFBundleName`
    pub name: Option<String>,
}

impl PackageInfo {
    /// The localized display name when it is set, the bundle name otherwise.
    pub fn title(&self) -> String {
        [self.display_name.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

/// Opens package files.
pub trait PackageBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PackageHandle>, IntrospectError>;
}

/// An opened package.
pub trait PackageHandle {
    /// Read the identity fields.
    fn load_info(&mut self) -> Result<PackageInfo, IntrospectError>;

    /// Stream the primary icon file, or `None` if the package declares none.
    fn icon_stream(&mut self) -> Result<Option<Box<dyn Read + '_>>, IntrospectError>;
}
