//! Circuit variant catalog.
//!
//! Validates variant labels, enumerates the known variants and derives, from
//! one declarative table, both the network locator and the local storage key
//! of every artifact.
//!
//! # Example
//!
//! ```
//! use zkart_catalog::{ArtifactFile, Catalog};
//!
//! let catalog = Catalog::default();
//! let variant = catalog.classify("01x01").unwrap();
//! let location = catalog.locate(&variant, ArtifactFile::ProvingKey);
//! assert_eq!(location.locator.path, "circuits/01x01/zkey.br");
//! assert_eq!(location.storage.as_str(), "artifacts-v2.1/01x01/zkey");
//! ```

pub mod constants;
mod digest;
mod error;
mod kind;
mod sanitize;
mod template;
mod variant;

pub use digest::DigestTable;
pub use error::{CatalogError, Result};
pub use kind::{ArtifactFile, ArtifactKind, ProgramFormat};
pub use sanitize::sanitize_segment;
pub use template::{ArtifactLocation, Catalog, NetworkLocator, StorageKey};
pub use variant::{Variant, VariantFamily, classify};
