//! Reference digests for the compressed artifact kinds.
//!
//! The manifest format mirrors what artifact publishers ship alongside a
//! catalog root:
//!
//! ```json
//! { "01x01": { "zkey": "<sha256 hex>", "wasm": "<sha256 hex>", "dat": "<sha256 hex>" } }
//! ```
//!
//! Verification keys are never listed; their integrity comes from content
//! addressing.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::kind::ArtifactFile;
use crate::variant::classify;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    zkey: Option<String>,
    wasm: Option<String>,
    dat:  Option<String>,
}

/// SHA-256 digests keyed by `(variant, file)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DigestTable {
    entries: HashMap<(String, ArtifactFile), [u8; 32]>,
}

impl DigestTable {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, variant: impl Into<String>, file: ArtifactFile, digest: [u8; 32]) {
        self.entries.insert((variant.into(), file), digest);
    }

    pub fn with(mut self, variant: impl Into<String>, file: ArtifactFile, digest: [u8; 32]) -> Self {
        self.insert(variant, file, digest);
        self
    }

    pub fn get(&self, variant: &str, file: ArtifactFile) -> Option<&[u8; 32]> {
        self.entries.get(&(variant.to_string(), file))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Parse a JSON digest manifest, rejecting unknown variants and bad hex.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: BTreeMap<String, ManifestEntry> = serde_json::from_str(json)?;
        let mut table = Self::new();

        for (label, entry) in manifest {
            let variant = classify(&label).map_err(|_| CatalogError::ManifestVariant(label.clone()))?;
            let listed = [
                (ArtifactFile::ProvingKey, entry.zkey),
                (ArtifactFile::Wasm, entry.wasm),
                (ArtifactFile::Native, entry.dat),
            ];
            for (file, hex) in listed {
                let Some(hex) = hex else { continue };
                let digest =
                    zkart_verify::parse_digest32(&hex).map_err(|source| CatalogError::InvalidDigest {
                        variant: label.clone(),
                        file,
                        source,
                    })?;
                table.insert(variant.as_str(), file, digest);
            }
        }

        Ok(table)
    }
}
