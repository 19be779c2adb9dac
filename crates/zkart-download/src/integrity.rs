use zkart_catalog::{ArtifactFile, DigestTable, Variant};
use zkart_verify::{Sha256Hasher, verify_digest};

use crate::error::Cause;

/// Checks decompressed artifacts against reference SHA-256 digests.
///
/// Only consulted for transports that do not verify content themselves.
#[derive(Clone, Debug, Default)]
pub struct IntegrityValidator {
    table: DigestTable,
}

impl IntegrityValidator {
    pub fn new(table: DigestTable) -> Self { Self { table } }

    pub fn table(&self) -> &DigestTable { &self.table }

    /// The verification key is never listed and always passes; every other
    /// file must have an entry.
    pub fn validate(&self, bytes: &[u8], variant: &Variant, file: ArtifactFile) -> Result<(), Cause> {
        if file == ArtifactFile::VerificationKey {
            return Ok(());
        }
        let expected = self
            .table
            .get(variant.as_str(), file)
            .ok_or(Cause::MissingDigest { file })?;
        verify_digest::<Sha256Hasher>(bytes, expected).map_err(Cause::IntegrityMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant() -> Variant { Variant::standard(1, 1).unwrap() }

    #[test]
    fn matching_digest_passes() {
        let table = DigestTable::new().with("01x01", ArtifactFile::ProvingKey, Sha256Hasher::digest(b"zkey"));
        IntegrityValidator::new(table)
            .validate(b"zkey", &variant(), ArtifactFile::ProvingKey)
            .unwrap();
    }

    #[test]
    fn wrong_digest_is_a_mismatch() {
        let table = DigestTable::new().with("01x01", ArtifactFile::Wasm, [0u8; 32]);
        let err = IntegrityValidator::new(table)
            .validate(b"wasm", &variant(), ArtifactFile::Wasm)
            .unwrap_err();
        assert!(matches!(err, Cause::IntegrityMismatch(_)));
    }

    #[test]
    fn missing_entry_is_fatal() {
        let err = IntegrityValidator::default()
            .validate(b"dat", &variant(), ArtifactFile::Native)
            .unwrap_err();
        assert!(matches!(err, Cause::MissingDigest { file: ArtifactFile::Native }));
    }

    #[test]
    fn verification_key_is_not_hashed() {
        IntegrityValidator::default()
            .validate(b"{}", &variant(), ArtifactFile::VerificationKey)
            .unwrap();
    }
}
