use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{
    MAX_STANDARD_COUNT, MIN_STANDARD_COUNT, PRIVACY_PROOF_PREFIX, PRIVACY_PROOF_SIZES,
};
use crate::error::{CatalogError, Result};
use crate::sanitize::ensure_basename;

static STANDARD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})x([0-9]{2})$").expect("static regex"));

/// The two disjoint variant families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantFamily {
    /// `NNxMM` transaction circuits.
    Standard,
    /// `POI_AxA` proof-of-innocence circuits.
    PrivacyProof,
}

impl VariantFamily {
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Standard => 0,
            Self::PrivacyProof => 1,
        }
    }
}

/// A validated catalog key.
///
/// Only obtainable through [`classify`] or the typed constructors, so holding a
/// `Variant` means its label is a safe single path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variant {
    family: VariantFamily,
    label:  String,
}

impl Variant {
    /// Standard variant with `nullifiers` inputs and `commitments` outputs.
    pub fn standard(nullifiers: u8, commitments: u8) -> Result<Self> {
        let label = format!("{nullifiers:02}x{commitments:02}");
        if !is_standard_count(nullifiers) || !is_standard_count(commitments) {
            return Err(CatalogError::InvalidVariant(label));
        }
        Ok(Self {
            family: VariantFamily::Standard,
            label,
        })
    }

    /// Square privacy-proof variant, `size` being one of [`PRIVACY_PROOF_SIZES`].
    pub fn privacy_proof(size: u8) -> Result<Self> {
        let label = format!("{PRIVACY_PROOF_PREFIX}{size}x{size}");
        if !PRIVACY_PROOF_SIZES.contains(&size) {
            return Err(CatalogError::InvalidVariant(label));
        }
        Ok(Self {
            family: VariantFamily::PrivacyProof,
            label,
        })
    }

    pub fn family(&self) -> VariantFamily { self.family }

    pub fn as_str(&self) -> &str { &self.label }

    /// Every standard variant, ordered by input then output count.
    pub fn standard_variants() -> impl Iterator<Item = Variant> {
        (MIN_STANDARD_COUNT..=MAX_STANDARD_COUNT).flat_map(|n| {
            (MIN_STANDARD_COUNT..=MAX_STANDARD_COUNT).map(move |c| Variant {
                family: VariantFamily::Standard,
                label:  format!("{n:02}x{c:02}"),
            })
        })
    }

    pub fn privacy_proof_variants() -> impl Iterator<Item = Variant> {
        PRIVACY_PROOF_SIZES.into_iter().map(|size| Variant {
            family: VariantFamily::PrivacyProof,
            label:  format!("{PRIVACY_PROOF_PREFIX}{size}x{size}"),
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.label) }
}

impl FromStr for Variant {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> { classify(s) }
}

impl AsRef<str> for Variant {
    fn as_ref(&self) -> &str { &self.label }
}

fn is_standard_count(count: u8) -> bool { (MIN_STANDARD_COUNT..=MAX_STANDARD_COUNT).contains(&count) }

/// Validate and classify a raw variant label.
///
/// Traversal is checked before anything else so crafted input never reaches
/// path construction; family membership is a literal prefix test.
pub fn classify(input: &str) -> Result<Variant> {
    if input.is_empty() {
        return Err(CatalogError::InvalidVariant(String::new()));
    }
    ensure_basename(input)?;

    if input.starts_with(PRIVACY_PROOF_PREFIX) {
        return Variant::privacy_proof_variants()
            .find(|v| v.label == input)
            .ok_or_else(|| CatalogError::InvalidVariant(input.to_string()));
    }

    let captures = STANDARD_PATTERN
        .captures(input)
        .ok_or_else(|| CatalogError::InvalidVariant(input.to_string()))?;
    let count = |i: usize| -> Result<u8> {
        captures[i]
            .parse::<u8>()
            .map_err(|_| CatalogError::InvalidVariant(input.to_string()))
    };
    Variant::standard(count(1)?, count(2)?)
}
