use crate::android::binary_xml::{is_binary_xml, parse_nodes, ResolvedNode};
use crate::android::text_manifest::parse_text_manifest;
use crate::android::zip::ApkZipError;
use serde::{Deserialize, Serialize};

const MANIFEST_TAG: &str = "manifest";
const ACTIVITY_TAG: &str = "activity";

/// Result alias for manifest fact extraction.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Why no manifest facts could be produced.
#[derive(Debug)]
pub enum ManifestError {
    /// The buffer does not start with the binary XML file chunk type.
    NotBinaryXml,
    /// No `manifest` element was found.
    NoManifestTag,
    /// The first `manifest` element has no usable `package` attribute.
    MissingPackage,
    /// The package archive could not be read.
    Apk(ApkZipError),
}

impl ManifestError {
    /// True for the outcomes that just mean "this is not a manifest we understand".
    pub fn is_not_found(&self) -> bool {
        !matches!(self, ManifestError::Apk(_))
    }
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::NotBinaryXml => write!(f, "Not a binary XML document"),
            ManifestError::NoManifestTag => write!(f, "No manifest element found"),
            ManifestError::MissingPackage => write!(f, "Manifest element has no package attribute"),
            ManifestError::Apk(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Apk(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApkZipError> for ManifestError {
    fn from(value: ApkZipError) -> Self {
        ManifestError::Apk(value)
    }
}

/// Package facts read from `AndroidManifest.xml`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFacts {
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_code: Option<String>,
    /// Name of the first `activity` element. No intent-filter check is made, so this is
    /// not necessarily the `MAIN`/`LAUNCHER` activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launchable_activity: Option<String>,
}

impl ManifestFacts {
    pub fn new(package_name: impl Into<String>) -> Self {
        ManifestFacts {
            package_name: package_name.into(),
            ..ManifestFacts::default()
        }
    }

    /// Decodes a binary manifest, `None` when it yields no package.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        decode_manifest(data).ok()
    }
}

/// Scans resolved nodes once for package facts.
///
/// The first `manifest` node supplies `package` (required), `versionName` and
/// `versionCode`. The first `activity` node with a `name` supplies
/// `launchable_activity`; a nameless activity before it is skipped.
pub fn extract_manifest_facts(nodes: &[ResolvedNode]) -> ManifestResult<ManifestFacts> {
    let mut manifest: Option<&ResolvedNode> = None;
    let mut activity: Option<&str> = None;

    for node in nodes {
        if manifest.is_none() && node.name == MANIFEST_TAG {
            manifest = Some(node);
        }
        if activity.is_none() && node.name == ACTIVITY_TAG {
            activity = node.attribute("name");
        }
        if manifest.is_some() && activity.is_some() {
            break;
        }
    }

    let manifest = manifest.ok_or(ManifestError::NoManifestTag)?;
    let package_name = manifest
        .attribute("package")
        .filter(|package| !package.is_empty())
        .ok_or(ManifestError::MissingPackage)?;

    Ok(ManifestFacts {
        package_name: package_name.to_string(),
        version_name: manifest.attribute("versionName").map(str::to_string),
        version_code: manifest.attribute("versionCode").map(str::to_string),
        launchable_activity: activity.map(str::to_string),
    })
}

/// Decodes a binary XML manifest into package facts.
pub fn decode_manifest(data: &[u8]) -> ManifestResult<ManifestFacts> {
    if !is_binary_xml(data) {
        return Err(ManifestError::NotBinaryXml);
    }
    extract_manifest_facts(&parse_nodes(data))
}

/// Reads facts from manifest entry bytes in either the binary or the textual form.
pub fn parse_manifest_entry(data: &[u8]) -> ManifestResult<ManifestFacts> {
    if is_binary_xml(data) {
        decode_manifest(data)
    } else {
        parse_text_manifest(&String::from_utf8_lossy(data))
    }
}
