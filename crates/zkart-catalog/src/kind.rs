use std::fmt;

use serde::{Deserialize, Serialize};

/// The three artifacts every circuit variant ships.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    VerificationKey,
    ProvingKey,
    Program,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::VerificationKey, Self::ProvingKey, Self::Program];

    /// Resolve to the physical file once the program representation is fixed.
    pub fn file(self, format: ProgramFormat) -> ArtifactFile {
        match self {
            Self::VerificationKey => ArtifactFile::VerificationKey,
            Self::ProvingKey => ArtifactFile::ProvingKey,
            Self::Program => match format {
                ProgramFormat::Wasm => ArtifactFile::Wasm,
                ProgramFormat::Native => ArtifactFile::Native,
            },
        }
    }

    /// Everything but the verification key is brotli compressed on the network.
    pub fn is_compressed(self) -> bool { self != Self::VerificationKey }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VerificationKey => "verification key",
            Self::ProvingKey => "proving key",
            Self::Program => "program",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Physical representation of the circuit program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramFormat {
    #[default]
    Wasm,
    Native,
}

/// A concrete artifact file: an [`ArtifactKind`] with the program format applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactFile {
    VerificationKey,
    ProvingKey,
    Wasm,
    Native,
}

impl ArtifactFile {
    pub const ALL: [ArtifactFile; 4] = [Self::VerificationKey, Self::ProvingKey, Self::Wasm, Self::Native];

    pub fn kind(self) -> ArtifactKind {
        match self {
            Self::VerificationKey => ArtifactKind::VerificationKey,
            Self::ProvingKey => ArtifactKind::ProvingKey,
            Self::Wasm | Self::Native => ArtifactKind::Program,
        }
    }

    /// Short name used in digest manifests and storage file names.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::VerificationKey => "vkey",
            Self::ProvingKey => "zkey",
            Self::Wasm => "wasm",
            Self::Native => "dat",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::VerificationKey => 0,
            Self::ProvingKey => 1,
            Self::Wasm => 2,
            Self::Native => 3,
        }
    }
}

impl fmt::Display for ArtifactFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.short_name()) }
}
