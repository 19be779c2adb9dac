//! Static reference data for the circuit artifact catalog.

/// Content root of the standard (transaction) circuit catalog.
pub const STANDARD_ROOT: &str = "QmUsmnK4PFc7zDp2cmC4wBZxYLjNyRgWfs5GNcJJ2uLcpU";

/// Content root of the privacy-proof (POI) circuit catalog.
pub const PRIVACY_PROOF_ROOT: &str = "QmZrP9zaZw2LwErT2yA6VpMWm65UdToQiKj4DtStVsUJHr";

/// Versioned directory every storage key lives under.
pub const STORAGE_ROOT: &str = "artifacts-v2.1";

/// Sub-root for privacy-proof variants inside [`STORAGE_ROOT`].
pub const PRIVACY_PROOF_STORAGE_DIR: &str = "poi-nov-2-23";

pub const PRIVACY_PROOF_PREFIX: &str = "POI_";

/// Square sizes of the privacy-proof circuits.
pub const PRIVACY_PROOF_SIZES: [u8; 2] = [3, 13];

pub const MIN_STANDARD_COUNT: u8 = 1;
pub const MAX_STANDARD_COUNT: u8 = 13;

/// Gateways used when the configuration names none.
pub const DEFAULT_GATEWAYS: [&str; 3] = [
    "https://ipfs-lb.com",
    "https://ipfs.io",
    "https://dweb.link",
];
