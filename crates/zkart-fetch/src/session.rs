//! Lazily opened, explicitly closable network handle shared by every fetch
//! of one transport.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;

struct Open<H> {
    handle: Arc<H>,
    closed: CancellationToken,
}

/// Owned session slot.
///
/// Opening is serialized through the write lock so concurrent callers create
/// the handle at most once. Fetches hold a [`SessionHandle`], not the lock,
/// so [`Session::close`] never waits on them; it cancels the session token
/// instead and they fail with [`FetchError::Closed`].
pub struct Session<H> {
    state: RwLock<Option<Open<H>>>,
}

impl<H> Default for Session<H> {
    fn default() -> Self { Self::new() }
}

impl<H> Session<H> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
        }
    }

    /// Open the session with `open` unless it is already open.
    ///
    /// Returns `true` when this call created the handle.
    pub async fn open_with<F, Fut>(&self, open: F) -> Result<bool, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<H, FetchError>>,
    {
        if self.state.read().await.is_some() {
            return Ok(false);
        }

        let mut state = self.state.write().await;
        if state.is_some() {
            return Ok(false);
        }

        let handle = open().await?;
        *state = Some(Open {
            handle: Arc::new(handle),
            closed: CancellationToken::new(),
        });
        Ok(true)
    }

    pub async fn handle(&self) -> Result<SessionHandle<H>, FetchError> {
        match self.state.read().await.as_ref() {
            Some(open) => Ok(SessionHandle {
                handle: Arc::clone(&open.handle),
                closed: open.closed.clone(),
            }),
            None => Err(FetchError::NotInitialized),
        }
    }

    /// Close the session; returns `false` if it was not open.
    pub async fn close(&self) -> bool {
        match self.state.write().await.take() {
            Some(open) => {
                open.closed.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn is_open(&self) -> bool { self.state.read().await.is_some() }
}

/// A fetch's view of an open session.
pub struct SessionHandle<H> {
    handle: Arc<H>,
    closed: CancellationToken,
}

impl<H> SessionHandle<H> {
    pub fn get(&self) -> &H { &self.handle }

    /// Run `fut`, failing with [`FetchError::Closed`] if the session closes first.
    pub async fn guard<T, Fut>(&self, fut: Fut) -> Result<T, FetchError>
    where
        Fut: Future<Output = Result<T, FetchError>>,
    {
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(FetchError::Closed),
            result = fut => result,
        }
    }
}
