//! Reading app identity out of a package file.
//!
//! | Step | Where |
//! |---|---|
//! | **Resolve capability** | [`resolve_backend`], fails without the `ipa` feature |
//! | **Open + Info.plist** | [`PackageBackend::open`], [`PackageHandle::load_info`] |
//! | **Icon** | [`PackageHandle::icon_stream`], drained by [`drain_icon`] |
//!
//! Nothing past this module ever sees a partially read icon: [`introspect`]
//! returns a finished [`InstallMetadata`] or the backend's error unchanged.

pub mod backend;
#[cfg(feature = "ipa")]
pub mod ipa;

pub use backend::{IntrospectError, PackageBackend, PackageHandle, PackageInfo};
#[cfg(feature = "ipa")]
pub use ipa::IpaBackend;

use crate::bundle::BundleError;
use crate::types::InstallMetadata;
use std::io::Read;
use std::path::Path;

/// Cargo feature that provides package-file support.
pub const IPA_FEATURE: &str = "ipa";

/// Get the package backend compiled into this build.
///
/// Callers must resolve the backend before touching the package file so a
/// build without the feature fails with a capability error instead of an
/// I/O error.
pub fn resolve_backend() -> Result<Box<dyn PackageBackend>, BundleError> {
    #[cfg(feature = "ipa")]
    {
        Ok(Box::new(IpaBackend))
    }
    #[cfg(not(feature = "ipa"))]
    {
        Err(BundleError::CapabilityUnavailable {
            feature: IPA_FEATURE,
        })
    }
}

/// Read identity and icon from the package at `path`.
pub fn introspect(
    path: &Path,
    backend: &dyn PackageBackend,
) -> Result<InstallMetadata, IntrospectError> {
    let mut package = backend.open(path)?;
    let info = package.load_info()?;
    let app_icon = match package.icon_stream()? {
        Some(stream) => Some(drain_icon(stream)?),
        None => None,
    };

    Ok(InstallMetadata {
        app_title: info.title(),
        bundle_identifier: info.identifier,
        bundle_version: info.version,
        bundle_marketing_version: info.marketing_version,
        app_icon,
    })
}

/// Read `stream` to its end into one buffer.
pub fn drain_icon(mut stream: impl Read) -> Result<Vec<u8>, IntrospectError> {
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::backend::tests::MockBackend;
    use super::*;
    use std::io;

    /// Yields its data a few bytes at a time, like a decompressing reader.
    struct Trickle<'a> {
        data: &'a [u8],
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.len().min(buf.len()).min(3);
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated entry"))
        }
    }

    fn demo_backend() -> MockBackend {
        MockBackend {
            info: PackageInfo {
                identifier: "com.x.y".to_string(),
                version: "42".to_string(),
                marketing_version: "1.2".to_string(),
                display_name: None,
                name: Some("DemoApp".to_string()),
            },
            icon: Some(vec![0x89, 0x50, 0x4E, 0x47]),
            ..MockBackend::default()
        }
    }

    #[test]
    fn introspect_maps_info_fields() {
        let backend = demo_backend();
        let meta = introspect(Path::new("Demo.ipa"), &backend).unwrap();
        assert_eq!(meta.bundle_identifier, "com.x.y");
        assert_eq!(meta.bundle_version, "42");
        assert_eq!(meta.bundle_marketing_version, "1.2");
        assert_eq!(meta.app_title, "DemoApp");
        assert_eq!(meta.app_icon.as_deref(), Some(&[0x89, 0x50, 0x4E, 0x47][..]));
        assert_eq!(*backend.opened.borrow(), vec!["Demo.ipa".to_string()]);
    }

    #[test]
    fn introspect_without_icon() {
        let backend = MockBackend {
            icon: None,
            ..demo_backend()
        };
        let meta = introspect(Path::new("Demo.ipa"), &backend).unwrap();
        assert_eq!(meta.app_icon, None);
    }

    #[test]
    fn introspect_propagates_parse_failure() {
        let backend = MockBackend {
            corrupt: true,
            ..demo_backend()
        };
        let err = introspect(Path::new("Demo.ipa"), &backend).unwrap_err();
        assert!(matches!(err, IntrospectError::Plist(_)));
    }

    #[test]
    fn drain_icon_collects_every_chunk() {
        let data: Vec<u8> = (0..=255).collect();
        let bytes = drain_icon(Trickle { data: &data }).unwrap();
        assert_eq!(bytes, data);
    }

    #[test]
    fn drain_icon_reports_read_errors() {
        let err = drain_icon(Broken).unwrap_err();
        assert!(matches!(err, IntrospectError::Io(_)));
    }

    #[cfg(feature = "ipa")]
    #[test]
    fn resolve_backend_available_with_feature() {
        assert!(resolve_backend().is_ok());
    }

    #[cfg(not(feature = "ipa"))]
    #[test]
    fn resolve_backend_names_missing_feature() {
        let err = resolve_backend().err().unwrap();
        assert!(err.to_string().contains("`ipa`"));
    }
}
