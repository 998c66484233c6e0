//! # CLI Command Implementations
//!
//! Each subcommand of `realm` lives in its own file with an `Args` struct
//! derived with `clap` and an `execute` function. Commands receive the
//! storage stack already built from the configuration and only call into
//! the `realm` library.

pub mod delete;
pub mod get;
pub mod list;
pub mod put;
