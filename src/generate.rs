//! Artifact rendering: the install page fragment and the manifest.
//!
//! Both documents are produced from an already-resolved [`InstallMetadata`]
//! and are pure functions of their inputs.
//!
//! ## HTML fragment
//!
//! ```html
//! <a href="itms-services://?action=download-manifest&amp;url=manifest.plist">
//!   <img width="200" height="200" src="data:image/png;base64,…">
//!   <span class="caption">Install <span class="title">Demo</span> (1.2 / 42)</span>
//! </a>
//! ```
//!
//! (whitespace added for readability; the real output is a single line). The
//! image is only present when the metadata carries icon bytes.
//!
//! ## Manifest
//!
//! An Apple property list describing one item with one `software-package`
//! asset, which is what the iOS installer expects behind an `itms-services`
//! link.
//!
//! ## Escaping
//!
//! Both documents are built with [maud](https://maud.lambda.xyz/), whose
//! interpolation escapes `&`, `<`, `>` and `"`. That covers HTML text and
//! attributes as well as plist `<string>` content, so titles such as
//! `A & B <App>` survive intact in either document.
//!
//! Plist strings additionally write `\r` as `&#13;`, since XML parsers
//! normalize a raw carriage return to `\n`. Characters XML 1.0 cannot carry
//! at all (see [`is_xml_char`]) are rejected before rendering, by
//! [`InstallMetadata::validate`] and the bundle pipeline.

use crate::link::link;
use crate::types::InstallMetadata;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use maud::{Markup, PreEscaped, html};

/// Edge length of the inline icon, in CSS pixels.
pub const DEFAULT_ICON_SIZE: u32 = 200;

const PLIST_PROLOGUE: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    "\n",
    r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#,
    "\n",
);

/// Whether `c` is allowed anywhere in an XML 1.0 document, escaped or not.
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Container format of an icon, sniffed from its first two bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Unknown,
}

impl ImageKind {
    /// `FF D8` is JPEG, `89 50` is PNG. Anything else, including input
    /// shorter than two bytes, is reported as unknown rather than guessed.
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes {
            [0xFF, 0xD8, ..] => ImageKind::Jpeg,
            [0x89, 0x50, ..] => ImageKind::Png,
            _ => ImageKind::Unknown,
        }
    }

    /// Subtype used in the `data:image/…` URI.
    pub fn tag(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Unknown => "unknown",
        }
    }
}

/// Inline `data:` URI carrying the icon bytes.
pub fn icon_data_uri(icon: &[u8]) -> String {
    format!(
        "data:image/{};base64,{}",
        ImageKind::sniff(icon).tag(),
        STANDARD.encode(icon)
    )
}

/// Render the install link fragment with the default icon size.
pub fn html(manifest_url: &str, metadata: &InstallMetadata) -> String {
    render_html(manifest_url, metadata, DEFAULT_ICON_SIZE).into_string()
}

/// Render the install link fragment.
pub fn render_html(manifest_url: &str, metadata: &InstallMetadata, icon_size: u32) -> Markup {
    html! {
        a href=(link(manifest_url)) {
            @if let Some(icon) = &metadata.app_icon {
                img width=(icon_size) height=(icon_size) src=(icon_data_uri(icon));
            }
            span.caption {
                "Install "
                span.title { (metadata.app_title) }
                " (" (metadata.bundle_marketing_version) " / " (metadata.bundle_version) ")"
            }
        }
    }
}

/// Render the installer manifest as plist XML text.
pub fn manifest(install_url: &str, metadata: &InstallMetadata) -> String {
    let mut out = String::from(PLIST_PROLOGUE);
    out.push_str(&render_manifest(install_url, metadata).into_string());
    out.push('\n');
    out
}

/// Render the `<plist>` element of the installer manifest.
pub fn render_manifest(install_url: &str, metadata: &InstallMetadata) -> Markup {
    html! {
        plist version="1.0" {
            dict {
                key { "items" }
                array {
                    dict {
                        key { "assets" }
                        array {
                            dict {
                                (entry("kind", "software-package"))
                                (entry("url", install_url))
                            }
                        }
                        key { "metadata" }
                        dict {
                            (entry("bundle-identifier", &metadata.bundle_identifier))
                            (entry("bundle-version", &metadata.bundle_version))
                            (entry("kind", "software"))
                            (entry("title", &metadata.app_title))
                        }
                    }
                }
            }
        }
    }
}

/// One `<key>`/`<string>` pair of a plist dictionary.
fn entry(name: &str, value: &str) -> Markup {
    html! {
        key { (name) }
        string { (plist_text(value)) }
    }
}

/// Escaped `<string>` content with carriage returns as character references.
fn plist_text(value: &str) -> Markup {
    html! {
        @for (i, part) in value.split('\r').enumerate() {
            @if i > 0 { (PreEscaped("&#13;")) }
            (part)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use percent_encoding::percent_decode_str;
    use plist::Value;

    fn demo() -> InstallMetadata {
        InstallMetadata {
            bundle_identifier: "com.x.y".to_string(),
            bundle_version: "42".to_string(),
            bundle_marketing_version: "1.2.0".to_string(),
            app_title: "Demo".to_string(),
            app_icon: None,
        }
    }

    fn with_icon(icon: &[u8]) -> InstallMetadata {
        InstallMetadata {
            app_icon: Some(icon.to_vec()),
            ..demo()
        }
    }

    /// Pull `(tag, payload)` out of the first `data:image/…` URI in `html`.
    fn inline_image(html: &str) -> (String, Vec<u8>) {
        let start = html.find("src=\"data:image/").unwrap() + "src=\"data:image/".len();
        let rest = &html[start..];
        let uri = &rest[..rest.find('"').unwrap()];
        let (tag, payload) = uri.split_once(";base64,").unwrap();
        (tag.to_string(), STANDARD.decode(payload).unwrap())
    }

    fn parse_manifest(text: &str) -> Value {
        Value::from_reader(std::io::Cursor::new(text.as_bytes())).unwrap()
    }

    /// Look up `items[0].<section>` as a dictionary.
    fn item_section<'a>(plist: &'a Value, section: &str) -> &'a plist::Dictionary {
        let items = plist.as_dictionary().unwrap().get("items").unwrap();
        let item = items.as_array().unwrap()[0].as_dictionary().unwrap();
        match item.get(section).unwrap() {
            Value::Array(assets) => assets[0].as_dictionary().unwrap(),
            other => other.as_dictionary().unwrap(),
        }
    }

    fn string_field<'a>(dict: &'a plist::Dictionary, key: &str) -> &'a str {
        dict.get(key).and_then(Value::as_string).unwrap()
    }

    // =========================================================================
    // HTML
    // =========================================================================

    #[test]
    fn html_without_icon_has_caption_and_no_image() {
        let out = html("manifest.plist", &demo());
        assert!(out.contains("Demo"));
        assert!(out.contains("1.2.0"));
        assert!(out.contains("42"));
        assert!(out.contains(r#"<span class="caption">Install <span class="title">Demo</span> (1.2.0 / 42)</span>"#));
        assert!(!out.contains("<img"));
    }

    #[test]
    fn html_links_to_manifest_trigger() {
        let out = html("https://x.test/manifest.plist", &demo());
        assert!(out.starts_with(
            r#"<a href="itms-services://?action=download-manifest&amp;url=https%3A%2F%2Fx.test%2Fmanifest.plist">"#
        ));
        assert!(out.ends_with("</a>"));
    }

    #[test]
    fn href_decodes_back_to_manifest_url() {
        let manifest_url = "https://x.test/a b/m.plist?t=1&u=2";
        let out = html(manifest_url, &demo());
        let start = out.find("url=").unwrap() + 4;
        let encoded = &out[start..start + out[start..].find('"').unwrap()];
        let decoded = percent_decode_str(encoded).decode_utf8().unwrap();
        assert_eq!(decoded, manifest_url);
    }

    #[test]
    fn jpeg_icon_is_labelled_jpg() {
        let icon = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        let (tag, payload) = inline_image(&html("m.plist", &with_icon(&icon)));
        assert_eq!(tag, "jpg");
        assert_eq!(payload, icon);
    }

    #[test]
    fn png_icon_is_labelled_png() {
        let icon = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0xFF];
        let (tag, payload) = inline_image(&html("m.plist", &with_icon(&icon)));
        assert_eq!(tag, "png");
        assert_eq!(payload, icon);
    }

    #[test]
    fn unrecognised_icon_is_still_embedded() {
        for icon in [&b"GIF89a"[..], &[0x89][..], &[][..], &[0xD8, 0xFF][..]] {
            let (tag, payload) = inline_image(&html("m.plist", &with_icon(icon)));
            assert_eq!(tag, "unknown");
            assert_eq!(payload, icon);
        }
    }

    #[test]
    fn icon_precedes_caption_with_configured_size() {
        let out = render_html("m.plist", &with_icon(&[0x89, 0x50]), 120).into_string();
        assert!(out.contains(r#"<img width="120" height="120" src="data:image/png;base64,iVA=">"#));
        assert!(out.find("<img").unwrap() < out.find("caption").unwrap());
    }

    #[test]
    fn html_escapes_title_and_versions() {
        let meta = InstallMetadata {
            app_title: "A & B <App>".to_string(),
            bundle_marketing_version: "\"1\"".to_string(),
            ..demo()
        };
        let out = html("m.plist", &meta);
        assert!(out.contains("A &amp; B &lt;App&gt;"));
        assert!(out.contains("&quot;1&quot;"));
        assert!(!out.contains("<App>"));
    }

    #[test]
    fn sniff_handles_short_input() {
        assert_eq!(ImageKind::sniff(&[]), ImageKind::Unknown);
        assert_eq!(ImageKind::sniff(&[0xFF]), ImageKind::Unknown);
        assert_eq!(ImageKind::sniff(&[0xFF, 0xD8]), ImageKind::Jpeg);
    }

    // =========================================================================
    // Manifest
    // =========================================================================

    #[test]
    fn manifest_has_plist_prologue() {
        let out = manifest("https://x.test/a.ipa", &demo());
        assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(out.contains("<!DOCTYPE plist"));
        assert!(out.contains(r#"<plist version="1.0">"#));
    }

    #[test]
    fn manifest_parses_with_expected_fields() {
        let plist = parse_manifest(&manifest("https://x.test/a.ipa", &demo()));

        let asset = item_section(&plist, "assets");
        assert_eq!(string_field(asset, "kind"), "software-package");
        assert_eq!(string_field(asset, "url"), "https://x.test/a.ipa");

        let meta = item_section(&plist, "metadata");
        assert_eq!(string_field(meta, "bundle-identifier"), "com.x.y");
        assert_eq!(string_field(meta, "bundle-version"), "42");
        assert_eq!(string_field(meta, "kind"), "software");
        assert_eq!(string_field(meta, "title"), "Demo");
    }

    #[test]
    fn manifest_roundtrips_markup_special_characters() {
        let meta = InstallMetadata {
            bundle_identifier: "com.x.<y>".to_string(),
            bundle_version: "4&2".to_string(),
            app_title: "A & B <App> \"quoted\" 'single'".to_string(),
            ..demo()
        };
        let install_url = "https://x.test/a.ipa?sig=1&exp=2";
        let plist = parse_manifest(&manifest(install_url, &meta));

        assert_eq!(string_field(item_section(&plist, "assets"), "url"), install_url);
        let fields = item_section(&plist, "metadata");
        assert_eq!(string_field(fields, "bundle-identifier"), meta.bundle_identifier);
        assert_eq!(string_field(fields, "bundle-version"), meta.bundle_version);
        assert_eq!(string_field(fields, "title"), meta.app_title);
    }

    #[test]
    fn manifest_cannot_be_injected() {
        let meta = InstallMetadata {
            app_title: "</string><key>evil</key><string>x".to_string(),
            ..demo()
        };
        let plist = parse_manifest(&manifest("a.ipa", &meta));
        let fields = item_section(&plist, "metadata");
        assert!(fields.get("evil").is_none());
        assert_eq!(string_field(fields, "title"), meta.app_title);
    }

    #[test]
    fn manifest_keeps_carriage_returns() {
        let meta = InstallMetadata {
            app_title: "A\rB\r\nC".to_string(),
            ..demo()
        };
        let out = manifest("a.ipa", &meta);
        assert!(out.contains("<string>A&#13;B&#13;\nC</string>"));
        assert!(!out.contains('\r'));

        let plist = parse_manifest(&out);
        assert_eq!(
            string_field(item_section(&plist, "metadata"), "title"),
            meta.app_title
        );
    }

    #[test]
    fn xml_chars() {
        for c in ['\t', '\n', '\r', ' ', 'é', '\u{D7FF}', '\u{E000}', '\u{FFFD}', '\u{1F600}'] {
            assert!(is_xml_char(c), "{c:?} should be allowed");
        }
        for c in ['\u{0}', '\u{1}', '\u{8}', '\u{B}', '\u{C}', '\u{E}', '\u{1F}', '\u{FFFE}', '\u{FFFF}'] {
            assert!(!is_xml_char(c), "{c:?} should be rejected");
        }
    }

    #[test]
    fn manifest_ignores_icon() {
        let plain = manifest("a.ipa", &demo());
        let iconned = manifest("a.ipa", &with_icon(&[0x89, 0x50, 1, 2, 3]));
        assert_eq!(plain, iconned);
    }
}
