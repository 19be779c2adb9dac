//! Local IPFS node strategy over the Kubo RPC API.

use std::time::Duration;

use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::http::{DEFAULT_TIMEOUT, build_client, get_bytes};
use crate::session::Session;
use crate::transport::Transport;

pub const DEFAULT_NODE_API: &str = "http://127.0.0.1:5001";

#[derive(Deserialize)]
struct VersionInfo {
    #[serde(rename = "Version")]
    version: String,
}

/// Fetches through a running node, which resolves and hash-checks every
/// block itself.
pub struct NodeTransport {
    api:     String,
    timeout: Duration,
    session: Session<reqwest::Client>,
}

impl Default for NodeTransport {
    fn default() -> Self { Self::new(DEFAULT_NODE_API) }
}

impl NodeTransport {
    pub fn new(api: impl Into<String>) -> Self {
        Self {
            api:     api.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            session: Session::new(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api(&self) -> &str { &self.api }

    async fn connect(api: &str, timeout: Duration) -> Result<reqwest::Client, FetchError> {
        let client = build_client(timeout)?;
        let url = format!("{api}/api/v0/version");
        let body = get_bytes(client.post(&url), &url)
            .await
            .map_err(|e| FetchError::Init(format!("node at {api} is unreachable: {e}")))?;
        let info: VersionInfo = serde_json::from_slice(&body)
            .map_err(|e| FetchError::Init(format!("unexpected version response from {api}: {e}")))?;
        info!(api, version = %info.version, "connected to IPFS node");
        Ok(client)
    }
}

impl Transport for NodeTransport {
    fn name(&self) -> &'static str { "node" }

    fn verifies_content(&self) -> bool { true }

    async fn init(&self) -> Result<(), FetchError> {
        let (api, timeout) = (self.api.as_str(), self.timeout);
        self.session.open_with(|| Self::connect(api, timeout)).await?;
        Ok(())
    }

    async fn fetch(&self, root: &str, path: &str) -> Result<Bytes, FetchError> {
        let session = self.session.handle().await?;
        let url = format!("{}/api/v0/cat", self.api);
        let arg = format!("/ipfs/{root}/{}", path.trim_start_matches('/'));
        debug!(%arg, "node cat");

        let request = session.get().post(&url).query(&[("arg", arg.as_str())]);
        session.guard(get_bytes(request, &url)).await
    }

    async fn shutdown(&self) {
        if self.session.close().await {
            debug!(api = %self.api, "node session closed");
        }
    }
}
