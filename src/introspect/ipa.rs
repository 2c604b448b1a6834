//! `.ipa` reader: a zip archive with the app bundle under `Payload/`.
//!
//! ```text
//! Demo.ipa
//! └── Payload/
//!     └── Demo.app/
//!         ├── Info.plist          identity (XML or binary plist)
//!         ├── AppIcon60x60@2x.png icon candidates, named by Info.plist
//!         ├── AppIcon60x60@3x.png
//!         └── ...
//! ```
//!
//! The icon is picked from the names listed under
//! `CFBundleIcons/CFBundlePrimaryIcon/CFBundleIconFiles`, then the legacy
//! `CFBundleIconFiles` and `CFBundleIconFile` keys. Each name is a prefix
//! (`AppIcon60x60` matches `AppIcon60x60@2x.png`); the largest matching PNG
//! wins. Icons are returned as stored, including Xcode's crushed PNG variant.

use super::backend::{IntrospectError, PackageBackend, PackageHandle, PackageInfo};
use plist::{Dictionary, Value};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

/// Package backend for iOS `.ipa` archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpaBackend;

impl PackageBackend for IpaBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PackageHandle>, IntrospectError> {
        let file = File::open(path)?;
        Ok(Box::new(IpaPackage::from_reader(BufReader::new(file))?))
    }
}

/// An opened `.ipa` with its Info.plist already parsed.
pub struct IpaPackage<R> {
    archive: ZipArchive<R>,
    /// `Payload/<Name>.app/`, with trailing slash.
    app_dir: String,
    info: Dictionary,
}

impl<R: Read + Seek> IpaPackage<R> {
    /// Open an archive and parse its app's Info.plist.
    pub fn from_reader(reader: R) -> Result<Self, IntrospectError> {
        let mut archive = ZipArchive::new(reader).map_err(archive_error)?;
        let app_dir = find_app_dir(archive.file_names()).ok_or(IntrospectError::MissingInfoPlist)?;

        let mut bytes = Vec::new();
        archive
            .by_name(&format!("{app_dir}Info.plist"))
            .map_err(archive_error)?
            .read_to_end(&mut bytes)?;
        let info = Value::from_reader(Cursor::new(bytes))
            .map_err(|e| IntrospectError::Plist(e.to_string()))?
            .into_dictionary()
            .ok_or_else(|| IntrospectError::Plist("root is not a dictionary".into()))?;

        Ok(Self {
            archive,
            app_dir,
            info,
        })
    }

    /// Archive paths of PNGs directly inside the app directory whose file
    /// name starts with one of `prefixes`.
    fn icon_entries(&self, prefixes: &[String]) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| {
                name.strip_prefix(self.app_dir.as_str())
                    .is_some_and(|file| {
                        !file.contains('/')
                            && file.to_ascii_lowercase().ends_with(".png")
                            && prefixes.iter().any(|p| file.starts_with(p.as_str()))
                    })
            })
            .map(String::from)
            .collect()
    }
}

impl<R: Read + Seek + 'static> PackageHandle for IpaPackage<R> {
    fn load_info(&mut self) -> Result<PackageInfo, IntrospectError> {
        Ok(PackageInfo {
            identifier: required_string(&self.info, "CFBundleIdentifier")?,
            version: required_string(&self.info, "CFBundleVersion")?,
            marketing_version: optional_string(&self.info, "CFBundleShortVersionString")
                .unwrap_or_default(),
            display_name: optional_string(&self.info, "CFBundleDisplayName"),
            name: optional_string(&self.info, "CFBundleName"),
        })
    }

    fn icon_stream(&mut self) -> Result<Option<Box<dyn Read + '_>>, IntrospectError> {
        let prefixes: Vec<String> = icon_names(&self.info)
            .into_iter()
            .map(|name| name.trim_end_matches(".png").to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if prefixes.is_empty() {
            return Ok(None);
        }

        let mut best: Option<(u64, String)> = None;
        for name in self.icon_entries(&prefixes) {
            let size = self.archive.by_name(&name).map_err(archive_error)?.size();
            if best.as_ref().is_none_or(|(largest, _)| size > *largest) {
                best = Some((size, name));
            }
        }

        match best {
            Some((_, name)) => {
                let entry: Box<dyn Read + '_> =
                    Box::new(self.archive.by_name(&name).map_err(archive_error)?);
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }
}

/// Find `Payload/<Name>.app/` by locating its Info.plist. Nested bundles
/// (extensions, watch apps) live deeper and are skipped.
fn find_app_dir<'a>(names: impl Iterator<Item = &'a str>) -> Option<String> {
    names
        .filter_map(|name| {
            let app = name.strip_prefix("Payload/")?.strip_suffix("/Info.plist")?;
            (app.ends_with(".app") && !app.contains('/')).then(|| format!("Payload/{app}/"))
        })
        .min()
}

/// Icon file names declared by Info.plist, most specific key first.
fn icon_names(info: &Dictionary) -> Vec<String> {
    let primary = info
        .get("CFBundleIcons")
        .and_then(Value::as_dictionary)
        .and_then(|icons| icons.get("CFBundlePrimaryIcon"))
        .and_then(Value::as_dictionary)
        .and_then(|primary| primary.get("CFBundleIconFiles"));
    let legacy = info.get("CFBundleIconFiles");

    let mut names: Vec<String> = [primary, legacy]
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_string)
        .map(String::from)
        .collect();
    if let Some(single) = info.get("CFBundleIconFile").and_then(Value::as_string) {
        names.push(single.to_string());
    }
    names
}

fn required_string(info: &Dictionary, key: &'static str) -> Result<String, IntrospectError> {
    optional_string(info, key)
        .filter(|s| !s.is_empty())
        .ok_or(IntrospectError::MissingKey(key))
}

fn optional_string(info: &Dictionary, key: &str) -> Option<String> {
    info.get(key).and_then(Value::as_string).map(String::from)
}

fn archive_error(err: ZipError) -> IntrospectError {
    match err {
        ZipError::Io(e) => IntrospectError::Io(e),
        other => IntrospectError::Archive(other.to_string()),
    }
}
