//! Error types for zkart-fetch.

use crate::trustless::CarError;

/// HTTP statuses worth another attempt.
pub const RETRYABLE_STATUS: [u16; 3] = [429, 503, 504];

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("transport initialization failed: {0}")]
    Init(String),

    #[error("transport is not initialized")]
    NotInitialized,

    #[error("transport was shut down")]
    Closed,

    #[error("no gateways configured")]
    NoGateways,

    #[error("content verification failed: {0}")]
    Content(#[from] CarError),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
                url:    url.to_string(),
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Classification consulted by [`run_with_retry`](crate::run_with_retry).
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for FetchError {
    /// Throttling/unavailability statuses and status-less network failures
    /// are transient; every other status and all local state errors are not.
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => RETRYABLE_STATUS.contains(status),
            FetchError::Network(_) | FetchError::Timeout => true,
            FetchError::Init(_)
            | FetchError::NotInitialized
            | FetchError::Closed
            | FetchError::NoGateways
            | FetchError::Content(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> FetchError {
        FetchError::Status {
            status,
            url: "http://gw/ipfs/x".into(),
        }
    }

    #[test]
    fn retryable_statuses() {
        for code in [429, 503, 504] {
            assert!(status(code).is_retryable(), "{code} should retry");
        }
    }

    #[test]
    fn terminal_statuses() {
        for code in [400, 401, 403, 404, 410, 500, 501, 502] {
            assert!(!status(code).is_retryable(), "{code} should not retry");
        }
    }

    #[test]
    fn status_less_network_failures_retry() {
        assert!(FetchError::Network("connection reset".into()).is_retryable());
        assert!(FetchError::Timeout.is_retryable());
        assert_eq!(FetchError::Timeout.status(), None);
    }

    #[test]
    fn local_state_errors_are_terminal() {
        assert!(!FetchError::Closed.is_retryable());
        assert!(!FetchError::NotInitialized.is_retryable());
        assert!(!FetchError::Init("boom".into()).is_retryable());
        assert!(!FetchError::Content(CarError::MissingBlock("bafy".into())).is_retryable());
    }
}
