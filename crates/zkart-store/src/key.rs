use std::path::{Component, Path};

use crate::error::{Result, StoreError};

/// Accept only relative `/`-separated keys made of normal components.
pub(crate) fn validate_key(key: &str) -> Result<&Path> {
    let path = Path::new(key);
    let valid = !key.contains(['\\', '\0'])
        && key.split('/').all(|s| !s.is_empty() && s != "." && s != "..")
        && path.components().all(|c| matches!(c, Component::Normal(_)));
    if valid { Ok(path) } else { Err(StoreError::InvalidKey(key.to_string())) }
}

/// `key` must live below `dir`.
pub(crate) fn validate_entry<'a>(dir: &str, key: &'a str) -> Result<&'a Path> {
    let dir_path = validate_key(dir)?;
    let path = validate_key(key)?;
    if path.starts_with(dir_path) && path != dir_path {
        Ok(path)
    } else {
        Err(StoreError::OutsideDir {
            dir: dir.to_string(),
            key: key.to_string(),
        })
    }
}
