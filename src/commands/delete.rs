//! # Delete Command Implementation
//!
//! Removes the chamber at a path. Siblings, children and ancestors are left
//! alone.

use anyhow::{Context, Result};
use clap::Args;

use realm::cancel::CancellationToken;
use realm::path;
use realm::storage::Storage;

/// Remove a chamber
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Logical path of the chamber to remove.
    pub path: String,
}

/// Execute the `delete` command.
pub fn execute(args: DeleteArgs, storage: &dyn Storage, token: &CancellationToken) -> Result<()> {
    storage
        .delete(token, &args.path)
        .with_context(|| format!("Failed to delete chamber {}", args.path))?;
    println!("Deleted {}", path::normalize(&args.path));
    Ok(())
}
