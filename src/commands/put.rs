//! # Put Command Implementation
//!
//! Stores a chamber document at a path, replacing whatever was there. The
//! document is read from `--file` or standard input and fully validated
//! (rule types, override ranges and ordering) before anything is written.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;

use realm::cancel::CancellationToken;
use realm::chamber::Chamber;
use realm::path;
use realm::storage::{ChamberStorage, Storage};

/// Store a chamber document
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Logical path of the chamber, e.g. /teams/search.
    pub path: String,

    /// JSON chamber document; read from standard input when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Execute the `put` command.
pub fn execute(args: PutArgs, storage: &dyn Storage, token: &CancellationToken) -> Result<()> {
    let document = match &args.file {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read chamber from standard input")?;
            buffer
        }
    };

    let chamber = parse_chamber(&document, &args.path)?;
    storage
        .put_chamber(token, &args.path, &chamber)
        .with_context(|| format!("Failed to store chamber {}", args.path))?;

    info!("stored {} rule(s) at {}", chamber.len(), args.path);
    println!("Stored {}", path::normalize(&args.path));
    Ok(())
}

/// Decodes a chamber document, naming it after the path when unnamed.
fn parse_chamber(document: &str, key: &str) -> Result<Chamber> {
    let mut chamber: Chamber =
        serde_json::from_str(document).context("Invalid chamber document")?;
    if chamber.name.is_empty() {
        chamber.name = path::name(key).to_string();
    }
    Ok(chamber)
}
