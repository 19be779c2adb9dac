use crate::ArtifactFile;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid variant '{0}'")]
    InvalidVariant(String),

    #[error("variant '{0}' escapes the artifact directory")]
    PathTraversal(String),

    #[error("malformed digest manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("digest manifest lists unknown variant '{0}'")]
    ManifestVariant(String),

    #[error("bad digest for {variant}/{file}: {source}")]
    InvalidDigest {
        variant: String,
        file:    ArtifactFile,
        source:  zkart_verify::VerificationError,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
