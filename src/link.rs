//! Device install trigger URLs.
//!
//! Opening `itms-services://?action=download-manifest&url=…` on an iOS device
//! makes the OS fetch the referenced manifest and start the install. The
//! manifest URL travels as a single opaque query value, so it is encoded with
//! the same rules as JavaScript's `encodeURIComponent`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left alone by `encodeURIComponent`: alphanumerics plus
/// `- _ . ! ~ * ' ( )`. Everything else is percent-encoded.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const TRIGGER_PREFIX: &str = "itms-services://?action=download-manifest&url=";

/// Percent-encode `value` for use as one query parameter value.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Build the install trigger URL for a manifest.
///
/// `manifest_url` may be absolute or relative to the page that carries the
/// link; it is embedded as-is apart from encoding.
pub fn link(manifest_url: &str) -> String {
    format!("{TRIGGER_PREFIX}{}", encode_component(manifest_url))
}
