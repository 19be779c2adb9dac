use std::fmt;
use std::path::PathBuf;

use zkart_catalog::{ArtifactFile, ArtifactKind, CatalogError};
use zkart_fetch::{DecompressError, FetchError};
use zkart_store::StoreError;
use zkart_verify::VerificationError;

/// Everything that can stop one artifact from reaching the store.
#[derive(Debug, thiserror::Error)]
pub enum Cause {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("transport initialization failed: {0}")]
    TransportInit(#[source] FetchError),

    #[error("fetch failed: {0}")]
    Fetch(#[source] FetchError),

    #[error(transparent)]
    Decompression(#[from] DecompressError),

    #[error("integrity check failed: {0}")]
    IntegrityMismatch(#[source] VerificationError),

    #[error("no reference digest for {file}")]
    MissingDigest { file: ArtifactFile },

    #[error("store read failed: {0}")]
    StoreRead(#[source] StoreError),

    #[error("store write failed: {0}")]
    StoreWrite(#[source] StoreError),

    #[error("cancelled")]
    Cancelled,
}

/// A failed retrieval with the variant, kind and attempt count it happened at.
#[derive(Debug, thiserror::Error)]
pub struct DownloadError {
    pub variant:  String,
    pub kind:     Option<ArtifactKind>,
    /// Network attempts made before giving up; zero when the failure was local.
    pub attempts: u32,
    #[source]
    pub cause:    Cause,
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{kind} of variant '{}'", self.variant)?,
            None => write!(f, "variant '{}'", self.variant)?,
        }
        if self.attempts > 0 {
            write!(f, " after {} attempt(s)", self.attempts)?;
        }
        write!(f, ": {}", self.cause)
    }
}

impl DownloadError {
    pub(crate) fn new(variant: impl Into<String>, kind: Option<ArtifactKind>, cause: impl Into<Cause>) -> Self {
        Self {
            variant: variant.into(),
            kind,
            attempts: 0,
            cause: cause.into(),
        }
    }

    pub(crate) fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn is_invalid_variant(&self) -> bool {
        matches!(self.cause, Cause::Catalog(CatalogError::InvalidVariant(_) | CatalogError::PathTraversal(_)))
    }

    pub fn is_cancelled(&self) -> bool { matches!(self.cause, Cause::Cancelled) }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("digest manifest '{path}': {source}")]
    Manifest {
        path:   PathBuf,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    Transport(#[from] FetchError),

    #[error("cannot determine the home directory; set store_dir explicitly")]
    NoHome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_context() {
        let err = DownloadError::new("01x01", Some(ArtifactKind::ProvingKey), Cause::Cancelled).attempts(3);
        assert_eq!(err.to_string(), "proving key of variant '01x01' after 3 attempt(s): cancelled");

        let err = DownloadError::new("nope", None, CatalogError::InvalidVariant("nope".into()));
        assert!(err.is_invalid_variant());
        assert_eq!(err.to_string(), "variant 'nope': invalid variant 'nope'");
    }
}
