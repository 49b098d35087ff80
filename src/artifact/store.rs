//! Directory-backed artifact store.
//!
//! Layout under the base directory:
//!
//! ```text
//! <base>/
//!   CURRENT                  name of the active version
//!   <version>/
//!     vectorizer.bin
//!     classifier.bin
//!     label_encoder.json
//!     manifest.json
//! ```
//!
//! A save writes every file into a hidden staging directory, syncs it, renames
//! it to its version name and only then replaces `CURRENT`. Readers therefore
//! see either the previous bundle or the complete new one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::artifact::bundle::{ArtifactBundle, Manifest};
use crate::error::{Result, SentimentError};
use crate::ml::label_encoder::LabelEncoder;

const CURRENT_FILE: &str = "CURRENT";
const VECTORIZER_FILE: &str = "vectorizer.bin";
const CLASSIFIER_FILE: &str = "classifier.bin";
const LABEL_ENCODER_FILE: &str = "label_encoder.json";
const MANIFEST_FILE: &str = "manifest.json";

/// Stores artifact bundles under a single base directory.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    base_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        ArtifactStore {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding `version`.
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.base_dir.join(version)
    }

    /// Persist `bundle` as a new version and make it current.
    pub fn save(&self, bundle: &ArtifactBundle) -> Result<Manifest> {
        self.save_with_manifest(bundle, Manifest::for_bundle(bundle))
    }

    /// Persist `bundle` with a caller-built manifest and make it current.
    pub fn save_with_manifest(&self, bundle: &ArtifactBundle, manifest: Manifest) -> Result<Manifest> {
        bundle.validate()?;
        manifest.check_matches(bundle)?;
        check_version_name(&manifest.version)?;

        let target = self.version_dir(&manifest.version);
        if target.exists() {
            return Err(SentimentError::other(format!(
                "artifact version {} already exists",
                manifest.version
            )));
        }

        fs::create_dir_all(&self.base_dir)?;
        let staging = self
            .base_dir
            .join(format!(".staging-{}", Uuid::new_v4().simple()));

        if let Err(e) = self.write_staging(&staging, bundle, &manifest) {
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                warn!("Failed to remove staging directory {}: {cleanup}", staging.display());
            }
            return Err(e);
        }

        fs::rename(&staging, &target)?;
        sync_dir(&self.base_dir);
        self.write_current(&manifest.version)?;

        info!("Saved artifact bundle {} to {}", manifest.version, target.display());
        Ok(manifest)
    }

    fn write_staging(&self, staging: &Path, bundle: &ArtifactBundle, manifest: &Manifest) -> Result<()> {
        fs::create_dir(staging)?;
        write_synced(&staging.join(VECTORIZER_FILE), &encode(&bundle.vectorizer)?)?;
        write_synced(&staging.join(CLASSIFIER_FILE), &encode(&bundle.classifier)?)?;
        write_synced(
            &staging.join(LABEL_ENCODER_FILE),
            &serde_json::to_vec_pretty(&bundle.label_encoder)?,
        )?;
        write_synced(&staging.join(MANIFEST_FILE), &serde_json::to_vec_pretty(manifest)?)?;
        sync_dir(staging);
        Ok(())
    }

    fn write_current(&self, version: &str) -> Result<()> {
        let temp = self
            .base_dir
            .join(format!(".{CURRENT_FILE}.{}.tmp", Uuid::new_v4().simple()));
        write_synced(&temp, version.as_bytes())?;
        fs::rename(&temp, self.base_dir.join(CURRENT_FILE))?;
        sync_dir(&self.base_dir);
        Ok(())
    }

    /// Name of the active version.
    pub fn current_version(&self) -> Result<String> {
        let path = self.base_dir.join(CURRENT_FILE);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SentimentError::artifact_missing(format!(
                "no current bundle under {}",
                self.base_dir.display()
            )),
            _ => SentimentError::Io(e),
        })?;

        let version = content.trim();
        if version.is_empty() {
            return Err(SentimentError::artifact_corrupt(format!(
                "{} is empty",
                path.display()
            )));
        }
        Ok(version.to_string())
    }

    /// Load the bundle `CURRENT` points to.
    pub fn load(&self) -> Result<ArtifactBundle> {
        let version = self.current_version()?;
        self.load_version(&version)
    }

    /// Load a specific version.
    pub fn load_version(&self, version: &str) -> Result<ArtifactBundle> {
        self.load_with_manifest(version).map(|(bundle, _)| bundle)
    }

    /// Load a specific version together with its manifest.
    pub fn load_with_manifest(&self, version: &str) -> Result<(ArtifactBundle, Manifest)> {
        check_version_name(version)?;
        let dir = self.version_dir(version);
        if !dir.is_dir() {
            return Err(SentimentError::artifact_missing(format!(
                "bundle version {version} not found under {}",
                self.base_dir.display()
            )));
        }
        debug!("Loading artifact bundle from {}", dir.display());

        let manifest: Manifest = decode_json(&dir, MANIFEST_FILE)?;
        let vectorizer = decode_bin(&dir, VECTORIZER_FILE)?;
        let classifier = decode_bin(&dir, CLASSIFIER_FILE)?;
        let label_encoder: LabelEncoder = decode_json(&dir, LABEL_ENCODER_FILE)?;
        let label_encoder = LabelEncoder::from_classes(label_encoder.classes().to_vec())?;

        let bundle = ArtifactBundle {
            vectorizer,
            classifier,
            label_encoder,
        };
        bundle.validate().map_err(|e| match e {
            SentimentError::ArtifactCorrupt(_) => e,
            other => SentimentError::artifact_corrupt(other.to_string()),
        })?;
        manifest.check_matches(&bundle)?;
        if manifest.version != version {
            return Err(SentimentError::artifact_corrupt(format!(
                "manifest names version {} but was found in {version}",
                manifest.version
            )));
        }

        info!("Loaded artifact bundle {version}");
        Ok((bundle, manifest))
    }

    /// Read the manifest of `version` without loading the model.
    pub fn manifest(&self, version: &str) -> Result<Manifest> {
        check_version_name(version)?;
        decode_json(&self.version_dir(version), MANIFEST_FILE)
    }

    /// All stored versions, oldest first.
    pub fn versions(&self) -> Result<Vec<String>> {
        if !self.base_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') && entry.path().join(MANIFEST_FILE).is_file() {
                    versions.push(name.to_string());
                }
            }
        }
        versions.sort();
        Ok(versions)
    }
}

fn check_version_name(version: &str) -> Result<()> {
    let valid = !version.is_empty()
        && !version.starts_with('.')
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(SentimentError::artifact_missing(format!(
            "invalid bundle version name '{version}'"
        )))
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| SentimentError::serialization(format!("Failed to encode artifact: {e}")))
}

fn read_part(dir: &Path, name: &str) -> Result<Vec<u8>> {
    fs::read(dir.join(name)).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            SentimentError::artifact_missing(format!("{name} missing from {}", dir.display()))
        }
        _ => SentimentError::Io(e),
    })
}

fn decode_bin<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let bytes = read_part(dir, name)?;
    let (value, read) = bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
        .map_err(|e| SentimentError::artifact_corrupt(format!("{name}: {e}")))?;
    if read != bytes.len() {
        return Err(SentimentError::artifact_corrupt(format!(
            "{name}: {} trailing bytes",
            bytes.len() - read
        )));
    }
    Ok(value)
}

fn decode_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let bytes = read_part(dir, name)?;
    serde_json::from_slice(&bytes).map_err(|e| SentimentError::artifact_corrupt(format!("{name}: {e}")))
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Flush directory entries where the platform allows opening a directory.
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        if let Err(e) = handle.sync_all() {
            debug!("Directory sync of {} failed: {e}", dir.display());
        }
    }
}
