//! # ipa-bundler
//!
//! Generates what an iOS device needs to install an app over the air:
//!
//! - an HTML fragment with an `itms-services://` install link,
//! - the `manifest.plist` that link points at,
//! - optionally, a QR code URL so the link can be opened from a phone.
//!
//! # Architecture: Single-Pass Pipeline
//!
//! ```text
//! BundleInput ──▶ normalize ──▶ resolve metadata ──▶ render ──▶ write
//!                 (options)     (direct | introspect) (generate)  (bundle)
//! ```
//!
//! The two rendered documents reference each other: the HTML links to the
//! manifest by URL, and the manifest points at the package download. Both are
//! pure functions of the resolved [`types::InstallMetadata`], so everything
//! except introspection and writing can be tested without touching disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`options`] | Merges caller input with defaults, picks direct vs. package-file mode |
//! | [`introspect`] | Reads identity and icon out of an `.ipa` (feature `ipa`) |
//! | [`generate`] | Renders the HTML fragment and the manifest with maud |
//! | [`link`] | `itms-services` trigger URLs and `encodeURIComponent` encoding |
//! | [`qr`] | QR image service URLs |
//! | [`bundle`] | Orchestration and writing |
//! | [`config`] | `ipa-bundler.toml` loading, merging, and validation |
//! | [`types`] | Shared types (`InstallMetadata`, `PackageSource`, `Artifacts`) |
//! | [`output`] | CLI summary formatting |
//!
//! # Design Decisions
//!
//! ## Package Reading Is Optional
//!
//! Reading `.ipa` files pulls in `zip` and `plist`. Builds without the `ipa`
//! feature still render bundles from caller-supplied metadata; asking them to
//! read a package fails with [`bundle::BundleError::CapabilityUnavailable`]
//! before the file is opened, which is distinct from a package that could not
//! be parsed ([`bundle::BundleError::Introspect`]).
//!
//! ## Escaped Output
//!
//! App titles come from arbitrary packages. Both documents are rendered with
//! maud, so `&`, `<`, `>` and `"` are escaped in the HTML and in the plist
//! strings alike, and a title can never change either document's structure.
//! Characters XML cannot carry at all are rejected up front with
//! [`bundle::BundleError::InvalidCharacter`].
//!
//! ## Icons Pass Through
//!
//! Icons are embedded as `data:` URIs exactly as found. Only the first two
//! bytes are inspected to label the MIME subtype (`jpg`, `png`, or
//! `unknown`); nothing is decoded or re-encoded.

pub mod bundle;
pub mod config;
pub mod generate;
pub mod introspect;
pub mod link;
pub mod options;
pub mod output;
pub mod qr;
pub mod types;

pub use bundle::{BundleError, create_bundle, write_bundle};
pub use generate::{html, manifest};
pub use link::link;
pub use options::BundleInput;
pub use qr::qr;
pub use types::{Artifacts, InstallMetadata, PackageSource};
