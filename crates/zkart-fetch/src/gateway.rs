use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::FetchError;

/// Round-robin rotation over gateway base URLs.
///
/// Every call to [`GatewayRing::next`] advances the cursor, so consecutive
/// requests and consecutive retries of one request land on different gateways.
#[derive(Debug)]
pub struct GatewayRing {
    gateways: Vec<String>,
    cursor:   AtomicUsize,
}

impl GatewayRing {
    pub fn new<I, S>(gateways: I) -> Result<Self, FetchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gateways: Vec<String> = gateways
            .into_iter()
            .map(|g| g.into().trim().trim_end_matches('/').to_string())
            .filter(|g| !g.is_empty())
            .collect();
        if gateways.is_empty() {
            return Err(FetchError::NoGateways);
        }
        Ok(Self {
            gateways,
            cursor: AtomicUsize::new(0),
        })
    }

    pub fn next(&self) -> &str {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.gateways.len();
        &self.gateways[index]
    }

    pub fn gateways(&self) -> &[String] { &self.gateways }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_in_order() {
        let ring = GatewayRing::new(["https://a", "https://b/", "https://c"]).unwrap();
        let picked: Vec<_> = (0..7).map(|_| ring.next().to_string()).collect();
        assert_eq!(
            picked,
            ["https://a", "https://b", "https://c", "https://a", "https://b", "https://c", "https://a"]
        );
    }

    #[test]
    fn rejects_empty_list() {
        assert!(matches!(GatewayRing::new(Vec::<String>::new()), Err(FetchError::NoGateways)));
        assert!(matches!(GatewayRing::new(["  ", "/"]), Err(FetchError::NoGateways)));
    }
}
