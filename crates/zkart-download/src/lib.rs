//! Retrieval pipeline for zero-knowledge circuit artifacts.
//!
//! A [`Downloader`] validates the variant, consults an
//! [`ArtifactStore`](zkart_store::ArtifactStore), and only on a miss fetches
//! through a [`Transport`](zkart_fetch::Transport) under a retry policy,
//! decompresses, checks digests where the transport does not, and stores the
//! result.
//!
//! # Example
//!
//! ```no_run
//! use zkart_download::{Config, Downloader};
//! use zkart_store::FsStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_default("zkart.toml")?;
//! let downloader = Downloader::new(config.transport.build()?, FsStore::new(config.store_dir()?), config.options())
//!     .with_digests(config.digest_table()?);
//!
//! let paths = downloader.download_variant("01x01").await?;
//! println!("{}", paths.proving_key);
//! downloader.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod downloader;
mod error;
mod flight;
mod integrity;
mod program;

pub use config::{Config, DownloadOptions, RetryConfig, Strategy, TransportConfig};
pub use downloader::Downloader;
pub use error::{Cause, ConfigError, DownloadError};
pub use integrity::IntegrityValidator;
pub use program::{ArtifactPaths, Program, VariantArtifacts};
