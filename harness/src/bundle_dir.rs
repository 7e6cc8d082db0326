//! On-disk form of an [`ArtifactBundleV1`].
//!
//! ```text
//! <dir>/
//!   config.json  pattern.json  search_trace.json  top_patterns.json
//!   manifest.json        every artifact with hash and normative flag
//!   digest_basis.json    normative artifacts only
//!   digest.txt           "sha256:<hex>"
//! ```
//!
//! Reading trusts nothing but the manifest's artifact list: a declared file
//! that is absent, a file that is not declared, and any hash disagreement
//! are all errors. The directory path never enters a hash.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use ges_kernel::proof::hash::{canonical_hash, ContentHash};
use ges_kernel::proof::hash_domain::HashDomain;
use serde::Deserialize;

use crate::bundle::{verify_bundle, ArtifactBundleV1, BundleArtifact, BundleVerifyError};

const MANIFEST_FILENAME: &str = "manifest.json";
const DIGEST_BASIS_FILENAME: &str = "digest_basis.json";
const DIGEST_FILENAME: &str = "digest.txt";
const MANIFEST_SCHEMA: &str = "bundle.v1";
const TEMP_PREFIX: &str = ".tmp_";

const METADATA_FILENAMES: [&str; 3] = [MANIFEST_FILENAME, DIGEST_BASIS_FILENAME, DIGEST_FILENAME];

#[derive(Debug, thiserror::Error)]
pub enum BundleDirError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{filename} is missing")]
    MissingMetadata { filename: &'static str },

    #[error("declared artifact {name} is missing")]
    MissingArtifact { name: String },

    #[error("{name} is not declared in the manifest")]
    ExtraFile { name: String },

    #[error("artifact name {name} is not a plain filename")]
    UnsafeArtifactName { name: String },

    #[error("manifest parse error: {detail}")]
    ManifestParse { detail: String },

    #[error("unsupported manifest schema {found}")]
    ManifestVersionMismatch { found: String },

    #[error("manifest entry {name} has malformed content_hash {value}")]
    ManifestEntryInvalid { name: String, value: String },

    #[error("digest.txt holds {stored} but digest_basis.json hashes to {recomputed}")]
    DigestMismatch { stored: String, recomputed: String },

    #[error(transparent)]
    Verify(#[from] BundleVerifyError),
}

#[derive(Deserialize)]
struct ManifestFile {
    schema_version: String,
    artifacts: Vec<ManifestEntry>,
}

#[derive(Deserialize)]
struct ManifestEntry {
    name: String,
    content_hash: String,
    normative: bool,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> BundleDirError + '_ {
    move |source| BundleDirError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Write a bundle to `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`BundleDirError::Io`] on any filesystem failure, or
/// [`BundleDirError::UnsafeArtifactName`] if an artifact name would escape
/// `dir`.
pub fn write_bundle_dir(bundle: &ArtifactBundleV1, dir: &Path) -> Result<(), BundleDirError> {
    std::fs::create_dir_all(dir).map_err(io_error(dir))?;

    for artifact in bundle.artifacts.values() {
        check_plain_name(&artifact.name)?;
        write_atomic(&dir.join(&artifact.name), &artifact.content)?;
    }

    write_atomic(&dir.join(MANIFEST_FILENAME), &bundle.manifest)?;
    write_atomic(&dir.join(DIGEST_BASIS_FILENAME), &bundle.digest_basis)?;
    write_atomic(&dir.join(DIGEST_FILENAME), bundle.digest.as_str().as_bytes())?;
    Ok(())
}

/// Load a bundle written by [`write_bundle_dir`] and verify it.
///
/// # Errors
///
/// Returns [`BundleDirError`] on any layout or integrity failure.
pub fn read_bundle_dir(dir: &Path) -> Result<ArtifactBundleV1, BundleDirError> {
    let [manifest, digest_basis, digest_text] =
        METADATA_FILENAMES.map(|filename| read_required(dir, filename));
    let (manifest, digest_basis, digest_text) = (manifest?, digest_basis?, digest_text?);

    let parsed: ManifestFile =
        serde_json::from_slice(&manifest).map_err(|e| BundleDirError::ManifestParse {
            detail: e.to_string(),
        })?;
    if parsed.schema_version != MANIFEST_SCHEMA {
        return Err(BundleDirError::ManifestVersionMismatch {
            found: parsed.schema_version,
        });
    }

    let mut artifacts = BTreeMap::new();
    for entry in parsed.artifacts {
        check_plain_name(&entry.name)?;
        let content_hash = ContentHash::parse(&entry.content_hash).ok_or_else(|| {
            BundleDirError::ManifestEntryInvalid {
                name: entry.name.clone(),
                value: entry.content_hash.clone(),
            }
        })?;
        let content = std::fs::read(dir.join(&entry.name)).map_err(|_| {
            BundleDirError::MissingArtifact {
                name: entry.name.clone(),
            }
        })?;
        artifacts.insert(
            entry.name.clone(),
            BundleArtifact {
                name: entry.name,
                content,
                content_hash,
                normative: entry.normative,
            },
        );
    }

    if let Some(extra) = list_files(dir)?
        .into_iter()
        .find(|f| !artifacts.contains_key(f) && !METADATA_FILENAMES.contains(&f.as_str()))
    {
        return Err(BundleDirError::ExtraFile { name: extra });
    }

    let digest = canonical_hash(HashDomain::BundleDigest, &digest_basis);
    let stored = String::from_utf8_lossy(&digest_text).trim().to_string();
    if digest.as_str() != stored {
        return Err(BundleDirError::DigestMismatch {
            stored,
            recomputed: digest.as_str().to_string(),
        });
    }

    let bundle = ArtifactBundleV1 {
        artifacts,
        manifest,
        digest_basis,
        digest,
    };
    verify_bundle(&bundle)?;
    Ok(bundle)
}

fn check_plain_name(name: &str) -> Result<(), BundleDirError> {
    let plain = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !METADATA_FILENAMES.contains(&name);
    if plain {
        Ok(())
    } else {
        Err(BundleDirError::UnsafeArtifactName {
            name: name.to_string(),
        })
    }
}

/// Write via temp file + rename.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), BundleDirError> {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{TEMP_PREFIX}{file_name}"));
    std::fs::write(&temp_path, content).map_err(io_error(&temp_path))?;
    std::fs::rename(&temp_path, path).map_err(io_error(path))?;
    Ok(())
}

fn read_required(dir: &Path, filename: &'static str) -> Result<Vec<u8>, BundleDirError> {
    std::fs::read(dir.join(filename)).map_err(|_| BundleDirError::MissingMetadata { filename })
}

/// Names of the regular files in `dir`, leftover temp files excluded.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, BundleDirError> {
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        if !entry.file_type().map_err(io_error(dir))?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if !name.starts_with(TEMP_PREFIX) => {
                names.insert(name);
            }
            Ok(_) => {}
            Err(raw) => {
                return Err(BundleDirError::ExtraFile {
                    name: raw.to_string_lossy().into_owned(),
                });
            }
        }
    }
    Ok(names)
}
