use crate::android::binary_xml::is_binary_xml;
use crate::android::manifest::{parse_manifest_entry, ManifestFacts, ManifestResult};
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;
use zip::read::ZipArchive;
use zip::result::ZipError;

/// Name of the manifest entry inside a package.
pub const ANDROID_MANIFEST: &str = "AndroidManifest.xml";

/// Result alias for APK (ZIP) operations.
pub type ApkZipResult<T> = Result<T, ApkZipError>;

/// Errors surfaced while reading a package archive.
#[derive(Debug)]
pub enum ApkZipError {
    Io(io::Error),
    Zip(ZipError),
    MissingEntry(String),
}

impl std::fmt::Display for ApkZipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApkZipError::Io(err) => write!(f, "I/O error: {err}"),
            ApkZipError::Zip(err) => write!(f, "ZIP error: {err}"),
            ApkZipError::MissingEntry(name) => write!(f, "Package has no {name} entry"),
        }
    }
}

impl std::error::Error for ApkZipError {}

impl From<io::Error> for ApkZipError {
    fn from(value: io::Error) -> Self {
        ApkZipError::Io(value)
    }
}

impl From<ZipError> for ApkZipError {
    fn from(value: ZipError) -> Self {
        ApkZipError::Zip(value)
    }
}

/// Returns the unmodified bytes of `AndroidManifest.xml` from any seekable archive.
pub fn read_manifest_entry_from<R: Read + Seek>(reader: R) -> ApkZipResult<Vec<u8>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entry = match archive.by_name(ANDROID_MANIFEST) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(ApkZipError::MissingEntry(ANDROID_MANIFEST.to_string()))
        }
        Err(err) => return Err(err.into()),
    };
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;
    debug!("read {} bytes of {}", data.len(), ANDROID_MANIFEST);
    Ok(data)
}

/// Returns the unmodified bytes of `AndroidManifest.xml` from the package at `path`.
pub fn read_manifest_entry(path: impl AsRef<Path>) -> ApkZipResult<Vec<u8>> {
    let path = path.as_ref();
    debug!("opening package {}", path.display());
    let file = File::open(path)?;
    read_manifest_entry_from(file)
}

/// Reads package facts from any seekable archive.
pub fn manifest_info_from_reader<R: Read + Seek>(reader: R) -> ManifestResult<ManifestFacts> {
    let data = read_manifest_entry_from(reader).map_err(|err| {
        warn!("cannot read {}: {}", ANDROID_MANIFEST, err);
        err
    })?;
    if !is_binary_xml(&data) {
        warn!("{} is not binary XML, scanning it as text", ANDROID_MANIFEST);
    }
    let facts = parse_manifest_entry(&data);
    if let Err(err) = &facts {
        warn!("no package facts in {}: {}", ANDROID_MANIFEST, err);
    }
    facts
}

/// Reads package facts from the package at `path`.
///
/// Binary manifests go through the binary XML decoder; anything else is scanned as
/// textual XML.
pub fn manifest_info_from_apk(path: impl AsRef<Path>) -> ManifestResult<ManifestFacts> {
    let path = path.as_ref();
    debug!("reading manifest facts from {}", path.display());
    let file = File::open(path).map_err(ApkZipError::from)?;
    manifest_info_from_reader(file)
}
