//! # Realm CLI
//!
//! This is the binary entry point for the `realm` command-line tool.
//!
//! It parses arguments with `clap`, opens the configured storage stack and
//! runs one command against it. All rule and storage logic lives in the
//! library crate; the binary is a thin caller.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
