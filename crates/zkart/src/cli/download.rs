use std::path::PathBuf;

use anyhow::Context;
use tracing::warn;
use zkart_catalog::ProgramFormat;
use zkart_download::Downloader;
use zkart_fetch::CancellationToken;
use zkart_store::FsStore;

#[derive(Debug, clap::Args)]
pub struct DownloadArg {
    /// Variants such as `01x01` or `POI_3x3`.
    #[arg(required = true)]
    pub variants: Vec<String>,
    /// Fetch the native prover program instead of WebAssembly.
    #[arg(long)]
    pub native:   bool,
    /// Configuration file, `~/.zkart/config.toml` by default.
    #[arg(long, short)]
    pub config:   Option<PathBuf>,
    /// Store directory, overriding the configuration.
    #[arg(long, short)]
    pub store:    Option<PathBuf>,
}

impl DownloadArg {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = super::load_config(self.config.as_deref())?;
        if self.native {
            config.program = ProgramFormat::Native;
        }
        if let Some(store) = self.store {
            config.store_dir = Some(store);
        }

        let store_dir = config.store_dir()?;
        let transport = config.transport.build().context("invalid transport configuration")?;
        let digests = config.digest_table()?;
        if digests.is_empty() && !transport_verifies(&config) {
            warn!("strategy 'http' needs a digest manifest; compressed artifacts will fail integrity checks");
        }

        let cancel = CancellationToken::new();
        let downloader = Downloader::new(transport, FsStore::new(&store_dir), config.options())
            .with_digests(digests)
            .with_cancellation(cancel.clone());

        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let mut result = Ok(());
        for variant in &self.variants {
            match downloader.download_variant(variant).await {
                Ok(paths) => {
                    println!("{}", paths.variant);
                    for key in [&paths.verification_key, &paths.proving_key, paths.program.get()] {
                        println!("  {}", store_dir.join(key.as_str()).display());
                    }
                }
                Err(e) => {
                    result = Err(e).with_context(|| format!("failed to download '{variant}'"));
                    break;
                }
            }
        }

        downloader.shutdown().await;
        interrupt.abort();
        result
    }
}

fn transport_verifies(config: &zkart_download::Config) -> bool {
    !matches!(config.transport.strategy, zkart_download::Strategy::Http)
}
