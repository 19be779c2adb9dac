//! Content digest primitives for downloaded artifacts.
//!
//! Provides incremental hashing behind a minimal [`Hasher`] trait plus the
//! comparison helpers the downloader uses to check decompressed artifacts
//! against a reference digest table.
//!
//! # Example
//!
//! ```
//! use zkart_verify::{verify_digest, Sha256Hasher};
//!
//! let expected = Sha256Hasher::digest(b"hello world");
//! verify_digest::<Sha256Hasher>(b"hello world", &expected).unwrap();
//! ```

pub use self::error::{Result, VerificationError};
pub use self::hasher::Hasher;

#[cfg(feature = "sha256")]
pub use self::hasher::Sha256Hasher;

mod error;
mod hasher;

/// Hash `data` with `H` and compare against `expected`.
pub fn verify_digest<H: Hasher + Default>(data: &[u8], expected: &[u8]) -> Result<()> {
    let mut hasher = H::default();
    hasher.update(data);
    let actual = hasher.finalize();
    if actual == expected {
        Ok(())
    } else {
        Err(VerificationError::Mismatch {
            expected: expected.to_vec(),
            actual,
        })
    }
}

/// Parse a hex encoded 32-byte digest.
pub fn parse_digest32(input: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(input.trim()).map_err(|source| VerificationError::InvalidHex {
        input: input.to_string(),
        source,
    })?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| VerificationError::InvalidLength { expected: 32, actual: len })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_WORLD: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[cfg(feature = "sha256")]
    #[test]
    fn test_sha256_hasher() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        let hash = hasher.finalize();

        assert_eq!(hash, hex::decode(HELLO_WORLD).unwrap());
        assert_eq!(Sha256Hasher::digest(b"hello world").to_vec(), hash);
    }

    #[cfg(feature = "sha256")]
    #[test]
    fn test_verify_digest_success() {
        let expected = parse_digest32(HELLO_WORLD).unwrap();
        verify_digest::<Sha256Hasher>(b"hello world", &expected).unwrap();
    }

    #[cfg(feature = "sha256")]
    #[test]
    fn test_verify_digest_mismatch() {
        let result = verify_digest::<Sha256Hasher>(b"hello world", &[0; 32]);

        match result {
            Err(VerificationError::Mismatch { expected, actual }) => {
                assert_eq!(expected, vec![0; 32]);
                assert_eq!(hex::encode(actual), HELLO_WORLD);
            }
            other => panic!("Expected Mismatch error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_digest32_rejects_bad_input() {
        assert!(matches!(
            parse_digest32("zz"),
            Err(VerificationError::InvalidHex { .. })
        ));
        assert!(matches!(
            parse_digest32("abcd"),
            Err(VerificationError::InvalidLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn test_mismatch_display_is_hex() {
        let err = VerificationError::Mismatch {
            expected: vec![0xab, 0xcd],
            actual:   vec![0x01],
        };
        assert_eq!(err.to_string(), "digest mismatch: expected abcd, got 01");
    }
}
