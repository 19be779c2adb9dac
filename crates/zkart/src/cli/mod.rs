mod download;
mod list;
mod locate;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use zkart_download::Config;

const CONFIG_DIR: &str = ".zkart";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Parser)]
#[command(name = "zkart", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "dl", name = "download", about = "Download every artifact of one or more variants")]
    Download(download::DownloadArg),
    #[command(alias = "ls", name = "list", about = "List known circuit variants")]
    List(list::ListArg),
    #[command(name = "locate", about = "Show network locators and storage keys of a variant")]
    Locate(locate::LocateArg),
}

impl App {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.cmd {
            Commands::Download(arg) => arg.run().await,
            Commands::List(arg) => arg.run(),
            Commands::Locate(arg) => arg.run(),
        }
    }
}

fn default_config_path() -> Option<PathBuf> { home::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE)) }

/// An explicit file must exist; the default one may be absent.
pub(crate) fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Config::load(path).with_context(|| format!("failed to load config '{}'", path.display())),
        None => match default_config_path() {
            Some(path) => {
                Config::load_or_default(&path).with_context(|| format!("failed to load config '{}'", path.display()))
            }
            None => Ok(Config::default()),
        },
    }
}
