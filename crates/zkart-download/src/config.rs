//! Downloader options and the TOML configuration file they can come from.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use zkart_catalog::constants::DEFAULT_GATEWAYS;
use zkart_catalog::{DigestTable, ProgramFormat};
use zkart_fetch::{
    AnyTransport, DEFAULT_NODE_API, FetchError, GatewayRing, HttpGateway, NodeTransport, RetryPolicy, TrustlessGateway,
};

use crate::error::ConfigError;

const DEFAULT_STORE_DIR: &str = ".zkart";

/// Per-downloader knobs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    pub program: ProgramFormat,
    pub retry:   RetryPolicy,
}

impl DownloadOptions {
    pub fn new() -> Self { Self::default() }

    pub fn program(mut self, program: ProgramFormat) -> Self {
        self.program = program;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// On-disk configuration. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub program:         ProgramFormat,
    pub store_dir:       Option<PathBuf>,
    pub digest_manifest: Option<PathBuf>,
    pub retry:           RetryConfig,
    pub transport:       TransportConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_retries:   u32,
    pub base_delay_ms: u64,
    pub jitter:        bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries:   policy.max_retries,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            jitter:        policy.jitter,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::default()
            .max_retries(config.max_retries)
            .base_delay(Duration::from_millis(config.base_delay_ms))
            .jitter(config.jitter)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Http,
    /// Default: checks every block itself, so no digest manifest is needed.
    #[default]
    Trustless,
    Node,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TransportConfig {
    pub strategy:     Strategy,
    pub gateways:     Vec<String>,
    pub node_api:     String,
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            strategy:     Strategy::default(),
            gateways:     DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect(),
            node_api:     DEFAULT_NODE_API.to_string(),
            timeout_secs: zkart_fetch::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl TransportConfig {
    pub fn build(&self) -> Result<AnyTransport, FetchError> {
        let timeout = Duration::from_secs(self.timeout_secs);
        Ok(match self.strategy {
            Strategy::Http => HttpGateway::new(GatewayRing::new(&self.gateways)?).timeout(timeout).into(),
            Strategy::Trustless => TrustlessGateway::new(GatewayRing::new(&self.gateways)?).timeout(timeout).into(),
            Strategy::Node => NodeTransport::new(&self.node_api).timeout(timeout).into(),
        })
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(input)?) }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn options(&self) -> DownloadOptions {
        DownloadOptions::new()
            .program(self.program)
            .retry(RetryPolicy::from(&self.retry))
    }

    /// Store root with `~/` expanded; `$HOME/.zkart` when unset.
    pub fn store_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.store_dir {
            Some(dir) => match dir.strip_prefix("~") {
                Ok(rest) => Ok(home::home_dir().ok_or(ConfigError::NoHome)?.join(rest)),
                Err(_) => Ok(dir.clone()),
            },
            None => Ok(home::home_dir().ok_or(ConfigError::NoHome)?.join(DEFAULT_STORE_DIR)),
        }
    }

    /// Reference digests from `digest_manifest`, or an empty table.
    pub fn digest_table(&self) -> Result<DigestTable, ConfigError> {
        let Some(path) = &self.digest_manifest else {
            return Ok(DigestTable::new());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        DigestTable::from_json(&json).map_err(|source| ConfigError::Manifest {
            path: path.clone(),
            source,
        })
    }
}
