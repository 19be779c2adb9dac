use zkart_catalog::{ArtifactFile, ProgramFormat, StorageKey, Variant};

/// The circuit program in exactly one of its two representations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Program<T> {
    Wasm(T),
    Native(T),
}

impl<T> Program<T> {
    pub fn new(format: ProgramFormat, value: T) -> Self {
        match format {
            ProgramFormat::Wasm => Program::Wasm(value),
            ProgramFormat::Native => Program::Native(value),
        }
    }

    pub fn format(&self) -> ProgramFormat {
        match self {
            Program::Wasm(_) => ProgramFormat::Wasm,
            Program::Native(_) => ProgramFormat::Native,
        }
    }

    pub fn file(&self) -> ArtifactFile {
        match self {
            Program::Wasm(_) => ArtifactFile::Wasm,
            Program::Native(_) => ArtifactFile::Native,
        }
    }

    pub fn get(&self) -> &T {
        match self {
            Program::Wasm(v) | Program::Native(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Program::Wasm(v) | Program::Native(v) => v,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Program<U> {
        match self {
            Program::Wasm(v) => Program::Wasm(f(v)),
            Program::Native(v) => Program::Native(f(v)),
        }
    }
}

/// The three artifacts of one variant, as storage keys or as bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantArtifacts<T> {
    pub variant:          Variant,
    pub verification_key: T,
    pub proving_key:      T,
    pub program:          Program<T>,
}

pub type ArtifactPaths = VariantArtifacts<StorageKey>;
