pub mod binary_xml;
pub mod chunk;
pub mod manifest;
pub mod string_pool;
pub mod text_manifest;
pub mod zip;

pub use binary_xml::{is_binary_xml, parse_nodes, RawNode, ResolvedNode};
pub use manifest::{
    decode_manifest, extract_manifest_facts, parse_manifest_entry, ManifestError, ManifestFacts,
    ManifestResult,
};
pub use string_pool::{decode_string_pool, StringPool};
pub use self::zip::{manifest_info_from_apk, read_manifest_entry, ApkZipError};
