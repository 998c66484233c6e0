//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use realm::cancel::CancellationToken;
use realm::config::StoreConfig;
use realm::defaults::CONFIG_ENV;

use crate::commands;

/// Log level used when neither the flag nor the configuration sets one.
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Realm - Version-aware configuration rules in a hierarchical store
#[derive(Parser, Debug)]
#[command(name = "realm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Store configuration file (.yaml, .yml, .json or .toml).
    ///
    /// Without one, chambers live in a plain-file store under the platform
    /// data directory.
    #[arg(long, global = true, value_name = "FILE", env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a chamber, or one rule resolved for a version
    Get(commands::get::GetArgs),

    /// Store a chamber document
    Put(commands::put::PutArgs),

    /// Remove a chamber
    Delete(commands::delete::DeleteArgs),

    /// List the chambers and directories under a prefix
    List(commands::list::ListArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => StoreConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => StoreConfig::default(),
        };

        let level = self
            .log_level
            .as_deref()
            .or(config.log_level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL);
        init_logging(level);

        let storage = config.build().context("Failed to open storage")?;
        let token = CancellationToken::new();

        match self.command {
            Commands::Get(args) => commands::get::execute(args, storage.as_ref(), &token),
            Commands::Put(args) => commands::put::execute(args, storage.as_ref(), &token),
            Commands::Delete(args) => commands::delete::execute(args, storage.as_ref(), &token),
            Commands::List(args) => commands::list::execute(args, storage.as_ref(), &token),
        }
    }
}

/// Starts `env_logger` at `level`; `RUST_LOG` takes precedence when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if let Err(e) = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init()
    {
        log::debug!("keeping the installed logger: {}", e);
    }
}
