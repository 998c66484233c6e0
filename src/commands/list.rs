//! # List Command Implementation
//!
//! Prints the immediate children of a prefix, one per line. Directories
//! carry a trailing `/`.

use anyhow::{Context, Result};
use clap::Args;

use realm::cancel::CancellationToken;
use realm::path;
use realm::storage::Storage;

/// List the chambers and directories under a prefix
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory to list.
    #[arg(default_value = "/")]
    pub prefix: String,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, storage: &dyn Storage, token: &CancellationToken) -> Result<()> {
    let prefix = path::ensure_trailing_slash(&args.prefix);
    let names = storage
        .list(token, &prefix)
        .with_context(|| format!("Failed to list {}", prefix))?;
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
