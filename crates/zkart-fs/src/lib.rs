//! Atomic filesystem primitives.
//!
//! Writers never expose a partially written file: content lands in a
//! sibling temporary file which is renamed over the destination only after
//! it has been fully written (and optionally synced).

mod error;

pub use error::{Error, Result};

use std::fs;
use std::io::Write;
use std::path::Path;

#[cfg(unix)]
const DEFAULT_PERMISSIONS: u32 = 0o644;

#[derive(Clone, Copy, Debug)]
pub struct AtomicWriteOptions {
    permissions: Option<u32>,
    sync:        bool,
    prefix:      &'static str,
    suffix:      &'static str,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self { Self::new() }
}

impl AtomicWriteOptions {
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            permissions: Some(DEFAULT_PERMISSIONS),
            #[cfg(not(unix))]
            permissions: None,
            sync:        true,
            prefix:      ".",
            suffix:      ".zkart.tmp",
        }
    }

    pub fn permissions(mut self, mode: u32) -> Self {
        self.permissions = Some(mode);
        self
    }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn prefix(mut self, prefix: &'static str) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = suffix;
        self
    }
}

/// Create `path` and all of its missing parents.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `content` to `path` through a temporary sibling and a rename.
///
/// The parent directory must exist. On any failure the temporary file is
/// removed and `path` is left untouched.
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8], options: AtomicWriteOptions) -> Result<()> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| Error::NoParent(path.to_path_buf()))?;

    let write_err = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(options.prefix)
        .suffix(options.suffix)
        .tempfile_in(parent)
        .map_err(write_err)?;

    tmp.write_all(content).map_err(write_err)?;

    #[cfg(unix)]
    if let Some(mode) = options.permissions {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode)).map_err(write_err)?;
    }

    if options.sync {
        tmp.as_file().sync_all().map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

pub fn atomic_read(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}
