//! Brotli decoding of network artifacts.

use std::io::{self, Read, Write};

use zkart_catalog::ArtifactKind;

const BUFFER_SIZE: usize = 4096;

#[derive(Debug, thiserror::Error)]
#[error("failed to decompress {kind}: {source}")]
pub struct DecompressError {
    pub kind:   ArtifactKind,
    #[source]
    pub source: io::Error,
}

/// Undo the network-side compression of `kind`.
///
/// The verification key travels as plain JSON and is returned untouched.
pub fn decompress(bytes: &[u8], kind: ArtifactKind) -> Result<Vec<u8>, DecompressError> {
    if !kind.is_compressed() {
        return Ok(bytes.to_vec());
    }

    let mut out = Vec::with_capacity(bytes.len().saturating_mul(3));
    brotli::Decompressor::new(bytes, BUFFER_SIZE)
        .read_to_end(&mut out)
        .map_err(|source| DecompressError { kind, source })?;
    Ok(out)
}

/// Inverse of [`decompress`], as applied when artifacts are published.
pub fn compress(bytes: &[u8], kind: ArtifactKind) -> io::Result<Vec<u8>> {
    if !kind.is_compressed() {
        return Ok(bytes.to_vec());
    }

    let mut writer = brotli::CompressorWriter::new(Vec::new(), BUFFER_SIZE, 9, 22);
    writer.write_all(bytes)?;
    Ok(writer.into_inner())
}
