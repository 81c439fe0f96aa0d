//! # AXML Manifest
//!
//! A library for reading package facts out of Android `AndroidManifest.xml` files, both the
//! compiled binary XML form found inside APKs and the plain text form some tools emit.
//!
//! Decoding is a pure function of the input bytes: malformed or truncated manifests give
//! fewer facts or none, never a panic.
//!
//! # Examples
//!
//! ```no_run
//!  use axml_manifest::manifest_info_from_apk;
//!
//!  let facts = manifest_info_from_apk("app-release.apk").unwrap();
//!  println!("{} {:?}", facts.package_name, facts.version_name);
//! ```
pub mod android;
#[cfg(test)]
mod tests;

pub use android::{
    decode_manifest, is_binary_xml, manifest_info_from_apk, parse_nodes, ManifestError,
    ManifestFacts, ResolvedNode,
};
