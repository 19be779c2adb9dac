//! Network side of artifact retrieval.
//!
//! A [`Transport`] turns a `(root, path)` locator into bytes. Three
//! strategies are provided: [`HttpGateway`] (plain gateway GETs with
//! round-robin rotation), [`TrustlessGateway`] (CAR responses verified block
//! by block) and [`NodeTransport`] (a local IPFS node). [`run_with_retry`]
//! wraps any fallible operation in exponential backoff, and [`decompress`]
//! undoes the brotli compression artifacts are published with.

mod decompress;
mod error;
mod gateway;
mod http;
mod node;
mod retry;
mod session;
mod transport;
pub mod trustless;

pub use decompress::{DecompressError, compress, decompress};
pub use error::{FetchError, RETRYABLE_STATUS, Retryable};
pub use gateway::GatewayRing;
pub use http::{DEFAULT_TIMEOUT, HttpGateway};
pub use node::{DEFAULT_NODE_API, NodeTransport};
pub use retry::{RetryError, RetryPolicy, retry_delay, run_with_retry};
pub use session::{Session, SessionHandle};
pub use transport::{AnyTransport, Transport};
pub use trustless::{CarError, TrustlessGateway};

pub use tokio_util::sync::CancellationToken;
