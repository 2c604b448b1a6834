//! CLI output formatting.
//!
//! Output is information-first: the app's identity leads, the files written
//! follow as `name → path` lines.
//!
//! ```text
//! Demo 1.2.0 (42)
//!     Identifier: com.example.demo
//!     Icon: png, 18234 bytes
//! index.html → public/index.html
//! manifest.plist → public/manifest.plist
//! ```
//!
//! Each `format_*` function returns `Vec<String>` and has no side effects; the
//! `print_*` wrapper writes the lines to stdout.

use crate::bundle::Bundle;
use crate::generate::ImageKind;
use crate::types::InstallMetadata;
use std::path::PathBuf;

/// Version shown by `--version`: the crate version on a release tag,
/// otherwise `dev@<short git hash>`.
pub fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once per process; the leak is bounded.
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `Title 1.2.0 (42)`, or `Title (42)` without a marketing version.
fn identity_header(metadata: &InstallMetadata) -> String {
    if metadata.bundle_marketing_version.is_empty() {
        format!("{} ({})", metadata.app_title, metadata.bundle_version)
    } else {
        format!(
            "{} {} ({})",
            metadata.app_title, metadata.bundle_marketing_version, metadata.bundle_version
        )
    }
}

fn icon_line(icon: Option<&[u8]>) -> String {
    match icon {
        Some(bytes) => format!(
            "Icon: {}, {} bytes",
            ImageKind::sniff(bytes).tag(),
            bytes.len()
        ),
        None => "Icon: none".to_string(),
    }
}

/// Format the summary of a written bundle.
pub fn format_bundle_output(bundle: &Bundle, written: &[PathBuf]) -> Vec<String> {
    let metadata = &bundle.metadata;
    let mut lines = vec![
        identity_header(metadata),
        format!("{}Identifier: {}", indent(1), metadata.bundle_identifier),
        format!("{}{}", indent(1), icon_line(metadata.app_icon.as_deref())),
    ];
    for path in written {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        lines.push(format!("{} → {}", name, path.display()));
    }
    lines
}

pub fn print_bundle_output(bundle: &Bundle, written: &[PathBuf]) {
    for line in format_bundle_output(bundle, written) {
        println!("{}", line);
    }
}
