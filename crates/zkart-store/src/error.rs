#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    #[error("key '{key}' is outside directory '{dir}'")]
    OutsideDir { dir: String, key: String },

    #[error("failed to read '{key}': {source}")]
    Read {
        key:    String,
        #[source]
        source: zkart_fs::Error,
    },

    #[error("failed to write '{key}': {source}")]
    Write {
        key:    String,
        #[source]
        source: zkart_fs::Error,
    },

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// Read-side failures, as opposed to writes and key validation.
    pub fn is_read(&self) -> bool { matches!(self, StoreError::Read { .. }) }
}

pub type Result<T> = std::result::Result<T, StoreError>;
