use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to create directory '{path}': {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("'{0}' has no parent directory")]
    NoParent(PathBuf),
}

impl Error {
    /// Whether the underlying I/O error was `NotFound`.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Write { source, .. } | Error::Read { source, .. } | Error::CreateDir { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            Error::NoParent(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
