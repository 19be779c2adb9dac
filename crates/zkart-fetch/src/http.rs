//! Plain HTTP gateway strategy and the request plumbing shared with the
//! verified gateway.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tracing::debug;

use crate::error::FetchError;
use crate::gateway::GatewayRing;
use crate::session::Session;
use crate::transport::Transport;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound on the buffer reserved from a `Content-Length` header.
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("zkart/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::Init(e.to_string()))
}

/// Send `request` and collect the body; non-2xx responses become
/// [`FetchError::Status`].
pub(crate) async fn get_bytes(request: reqwest::RequestBuilder, url: &str) -> Result<Bytes, FetchError> {
    let response = request.send().await.map_err(|e| FetchError::from_reqwest(e, url))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url:    url.to_string(),
        });
    }

    let hint = response.content_length().map_or(0, |n| n.min(MAX_PREALLOC));
    let mut body = BytesMut::with_capacity(hint as usize);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk.map_err(|e| FetchError::from_reqwest(e, url))?);
    }
    Ok(body.freeze())
}

pub(crate) fn ipfs_url(gateway: &str, root: &str, path: &str) -> String {
    format!("{gateway}/ipfs/{root}/{}", path.trim_start_matches('/'))
}

/// `GET {gateway}/ipfs/{root}/{path}` against a rotating gateway list.
///
/// Nothing here checks what comes back; pair it with digest validation.
pub struct HttpGateway {
    ring:    GatewayRing,
    timeout: Duration,
    session: Session<reqwest::Client>,
}

impl HttpGateway {
    pub fn new(ring: GatewayRing) -> Self {
        Self {
            ring,
            timeout: DEFAULT_TIMEOUT,
            session: Session::new(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn gateways(&self) -> &GatewayRing { &self.ring }
}

impl Transport for HttpGateway {
    fn name(&self) -> &'static str { "http" }

    fn verifies_content(&self) -> bool { false }

    async fn init(&self) -> Result<(), FetchError> {
        let timeout = self.timeout;
        if self.session.open_with(|| async move { build_client(timeout) }).await? {
            debug!(gateways = self.ring.gateways().len(), "http gateway session opened");
        }
        Ok(())
    }

    async fn fetch(&self, root: &str, path: &str) -> Result<Bytes, FetchError> {
        let session = self.session.handle().await?;
        let url = ipfs_url(self.ring.next(), root, path);
        debug!(%url, "requesting");
        session.guard(get_bytes(session.get().get(&url), &url)).await
    }

    async fn shutdown(&self) {
        if self.session.close().await {
            debug!("http gateway session closed");
        }
    }
}
