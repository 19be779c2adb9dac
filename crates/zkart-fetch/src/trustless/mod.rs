//! Verified gateway strategy: fetch the path as a CAR and check every block
//! against the requested root before handing bytes back.

mod car;
mod cid;
mod pb;

use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

pub use car::extract_path;
pub use cid::Cid;

use crate::error::FetchError;
use crate::gateway::GatewayRing;
use crate::http::{DEFAULT_TIMEOUT, build_client, get_bytes, ipfs_url};
use crate::session::Session;
use crate::transport::Transport;

const CAR_MEDIA_TYPE: &str = "application/vnd.ipld.car";

#[derive(Debug, thiserror::Error)]
pub enum CarError {
    #[error("block {0} is not in the CAR response")]
    MissingBlock(String),

    #[error("block {0} does not match its hash")]
    DigestMismatch(String),

    #[error("CAR data is truncated")]
    Truncated,

    #[error("unsupported CID: {0}")]
    UnsupportedCid(String),

    #[error("cannot descend into {0}: parent is not a directory")]
    NotADirectory(String),

    #[error("directory has no entry named {0}")]
    MissingLink(String),

    #[error("cannot descend into {0}: sharded directories are not supported")]
    Sharded(String),

    #[error("{0} is not a file")]
    NotAFile(String),

    #[error("malformed block: {0}")]
    Malformed(&'static str),

    #[error("DAG nesting is too deep")]
    TooDeep,
}

/// Gateway client that trusts the hash, not the gateway.
pub struct TrustlessGateway {
    ring:    GatewayRing,
    timeout: Duration,
    session: Session<reqwest::Client>,
}

impl TrustlessGateway {
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
}

impl Transport for TrustlessGateway {
    fn name(&self) -> &'static str { "trustless" }

    fn verifies_content(&self) -> bool { true }

    async fn init(&self) -> Result<(), FetchError> {
        let timeout = self.timeout;
        if self.session.open_with(|| async move { build_client(timeout) }).await? {
            debug!(gateways = self.ring.gateways().len(), "trustless gateway session opened");
        }
        Ok(())
    }

    async fn fetch(&self, root: &str, path: &str) -> Result<Bytes, FetchError> {
        let session = self.session.handle().await?;
        let root_cid = Cid::parse_str(root)?;
        let url = format!("{}?format=car&dag-scope=entity", ipfs_url(self.ring.next(), root, path));
        debug!(%url, "requesting CAR");

        let request = session.get().get(&url).header(reqwest::header::ACCEPT, CAR_MEDIA_TYPE);
        let car = session.guard(get_bytes(request, &url)).await?;
        let file = extract_path(&root_cid, path, &car)?;
        Ok(Bytes::from(file))
    }

    async fn shutdown(&self) {
        if self.session.close().await {
            debug!("trustless gateway session closed");
        }
    }
}
