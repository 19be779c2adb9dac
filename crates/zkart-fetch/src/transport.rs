use std::future::Future;

use bytes::Bytes;

use crate::error::FetchError;
use crate::http::HttpGateway;
use crate::node::NodeTransport;
use crate::trustless::TrustlessGateway;

/// Resolves `(root, path)` pairs to raw bytes on a content-addressed network.
///
/// `init` and `shutdown` are idempotent. `fetch` fails with
/// [`FetchError::NotInitialized`] before `init` and with
/// [`FetchError::Closed`] when `shutdown` races it.
pub trait Transport: Send + Sync {
    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;

    /// Whether returned bytes are already checked against the requested root.
    fn verifies_content(&self) -> bool;

    fn init(&self) -> impl Future<Output = Result<(), FetchError>> + Send;

    fn fetch(&self, root: &str, path: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send;

    fn shutdown(&self) -> impl Future<Output = ()> + Send;
}

/// One of the built-in strategies, chosen at construction time.
pub enum AnyTransport {
    Http(HttpGateway),
    Trustless(TrustlessGateway),
    Node(NodeTransport),
}

impl From<HttpGateway> for AnyTransport {
    fn from(t: HttpGateway) -> Self { AnyTransport::Http(t) }
}

impl From<TrustlessGateway> for AnyTransport {
    fn from(t: TrustlessGateway) -> Self { AnyTransport::Trustless(t) }
}

impl From<NodeTransport> for AnyTransport {
    fn from(t: NodeTransport) -> Self { AnyTransport::Node(t) }
}

impl Transport for AnyTransport {
    fn name(&self) -> &'static str {
        match self {
            AnyTransport::Http(t) => t.name(),
            AnyTransport::Trustless(t) => t.name(),
            AnyTransport::Node(t) => t.name(),
        }
    }

    fn verifies_content(&self) -> bool {
        match self {
            AnyTransport::Http(t) => t.verifies_content(),
            AnyTransport::Trustless(t) => t.verifies_content(),
            AnyTransport::Node(t) => t.verifies_content(),
        }
    }

    async fn init(&self) -> Result<(), FetchError> {
        match self {
            AnyTransport::Http(t) => t.init().await,
            AnyTransport::Trustless(t) => t.init().await,
            AnyTransport::Node(t) => t.init().await,
        }
    }

    async fn fetch(&self, root: &str, path: &str) -> Result<Bytes, FetchError> {
        match self {
            AnyTransport::Http(t) => t.fetch(root, path).await,
            AnyTransport::Trustless(t) => t.fetch(root, path).await,
            AnyTransport::Node(t) => t.fetch(root, path).await,
        }
    }

    async fn shutdown(&self) {
        match self {
            AnyTransport::Http(t) => t.shutdown().await,
            AnyTransport::Trustless(t) => t.shutdown().await,
            AnyTransport::Node(t) => t.shutdown().await,
        }
    }
}
