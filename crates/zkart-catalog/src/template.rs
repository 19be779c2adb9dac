//! Declarative `(family, file) -> path` table.
//!
//! Both the network path and the storage key of an artifact come out of
//! [`Catalog::locate`], which is the only place these templates are expanded.

use std::fmt;

use crate::constants::{PRIVACY_PROOF_ROOT, PRIVACY_PROOF_STORAGE_DIR, STANDARD_ROOT, STORAGE_ROOT};
use crate::error::Result;
use crate::kind::ArtifactFile;
use crate::variant::{Variant, VariantFamily, classify};

const PLACEHOLDER: &str = "{variant}";

struct Template {
    family:  VariantFamily,
    file:    ArtifactFile,
    network: &'static str,
    storage: &'static str,
}

const fn template(
    family: VariantFamily,
    file: ArtifactFile,
    network: &'static str,
    storage: &'static str,
) -> Template {
    Template {
        family,
        file,
        network,
        storage,
    }
}

/// Indexed by `family.index() * 4 + file.index()`.
const TEMPLATES: [Template; 8] = {
    use ArtifactFile::*;
    use VariantFamily::*;
    [
        template(Standard, VerificationKey, "circuits/{variant}/vkey.json", "vkey.json"),
        template(Standard, ProvingKey, "circuits/{variant}/zkey.br", "zkey"),
        template(Standard, Wasm, "prover/snarkjs/{variant}.wasm.br", "wasm"),
        template(Standard, Native, "prover/native/{variant}.dat.br", "dat"),
        template(PrivacyProof, VerificationKey, "{variant}/vkey.json", "vkey.json"),
        template(PrivacyProof, ProvingKey, "{variant}/zkey.br", "zkey"),
        template(PrivacyProof, Wasm, "{variant}/wasm.br", "wasm"),
        template(PrivacyProof, Native, "{variant}/dat.br", "dat"),
    ]
};

fn lookup(family: VariantFamily, file: ArtifactFile) -> &'static Template {
    let template = &TEMPLATES[family.index() * ArtifactFile::ALL.len() + file.index()];
    debug_assert_eq!((template.family, template.file), (family, file));
    template
}

/// Where an artifact lives on the content-addressed network.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NetworkLocator {
    pub root: String,
    pub path: String,
}

impl fmt::Display for NetworkLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "/ipfs/{}/{}", self.root, self.path) }
}

/// Relative key of an artifact in the local store, plus the directory holding it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey {
    dir: String,
    key: String,
}

impl StorageKey {
    pub fn as_str(&self) -> &str { &self.key }

    pub fn dir(&self) -> &str { &self.dir }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.key) }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str { &self.key }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub file:    ArtifactFile,
    pub locator: NetworkLocator,
    pub storage: StorageKey,
}

/// Roots and layout of the artifact catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    standard_root:      String,
    privacy_proof_root: String,
    storage_root:       String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            standard_root:      STANDARD_ROOT.to_string(),
            privacy_proof_root: PRIVACY_PROOF_ROOT.to_string(),
            storage_root:       STORAGE_ROOT.to_string(),
        }
    }
}

impl Catalog {
    pub fn new() -> Self { Self::default() }

    pub fn standard_root(mut self, root: impl Into<String>) -> Self {
        self.standard_root = root.into();
        self
    }

    pub fn privacy_proof_root(mut self, root: impl Into<String>) -> Self {
        self.privacy_proof_root = root.into();
        self
    }

    pub fn storage_root(mut self, root: impl Into<String>) -> Self {
        self.storage_root = root.into();
        self
    }

    pub fn classify(&self, input: &str) -> Result<Variant> { classify(input) }

    pub fn root_for(&self, family: VariantFamily) -> &str {
        match family {
            VariantFamily::Standard => &self.standard_root,
            VariantFamily::PrivacyProof => &self.privacy_proof_root,
        }
    }

    /// Directory holding every artifact of `variant`.
    pub fn storage_dir(&self, variant: &Variant) -> String {
        match variant.family() {
            VariantFamily::Standard => format!("{}/{}", self.storage_root, variant),
            VariantFamily::PrivacyProof => {
                format!("{}/{}/{}", self.storage_root, PRIVACY_PROOF_STORAGE_DIR, variant)
            }
        }
    }

    pub fn locate(&self, variant: &Variant, file: ArtifactFile) -> ArtifactLocation {
        let template = lookup(variant.family(), file);
        let dir = self.storage_dir(variant);
        let key = format!("{}/{}", dir, template.storage);
        ArtifactLocation {
            file,
            locator: NetworkLocator {
                root: self.root_for(variant.family()).to_string(),
                path: template.network.replace(PLACEHOLDER, variant.as_str()),
            },
            storage: StorageKey { dir, key },
        }
    }
}
