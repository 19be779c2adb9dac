//! Byte stores that downloaded artifacts are persisted to.
//!
//! Keys are relative `/`-separated paths such as
//! `artifacts-v2.1/01x01/zkey`. Both stores reject keys that would escape
//! their root.

mod error;
mod fs;
mod key;
mod memory;

use std::future::Future;

use bytes::Bytes;

pub use error::{Result, StoreError};
pub use fs::FsStore;
pub use memory::MemoryStore;

/// Key-value byte store consulted before and written after every fetch.
///
/// After `store` returns, `exists` and `get` observe the write.
pub trait ArtifactStore: Send + Sync {
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Persist `bytes` under `key`, creating `dir` (a prefix of `key`) first.
    fn store(&self, dir: &str, key: &str, bytes: Bytes) -> impl Future<Output = Result<()>> + Send;
}
