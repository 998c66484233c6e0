//! # Realm
//!
//! Hierarchical, version-aware configuration rules ("toggles") stored in
//! pluggable backends. Applications read rule values resolved for their
//! own semantic version; operators write rules, optionally scoped to
//! version ranges, into chambers arranged in a path namespace.
//!
//! ## Quick Example
//!
//! ```
//! use realm::cancel::CancellationToken;
//! use realm::chamber::{Chamber, ChamberEntry};
//! use realm::overrides::{Override, OverrideableRule};
//! use realm::storage::builder::StorageBuilder;
//! use realm::storage::memory::MemoryStorage;
//! use realm::storage::ChamberStorage;
//!
//! let storage = StorageBuilder::new(Box::new(MemoryStorage::new()))
//!     .inheritable(true)
//!     .build();
//! let token = CancellationToken::new();
//!
//! let rule = OverrideableRule::with_overrides(
//!     "slow",
//!     vec![Override::new("v2.0.0", "", "fast").unwrap()],
//! )
//! .unwrap();
//! storage
//!     .put_chamber(&token, "/services/", &Chamber::new("services").with_rule("mode", rule))
//!     .unwrap();
//! storage
//!     .put_chamber(&token, "/services/search", &Chamber::new("search"))
//!     .unwrap();
//!
//! let chamber = storage.get_chamber(&token, "/services/search").unwrap();
//! let entry = ChamberEntry::new(chamber, "v2.1.0").unwrap();
//! assert_eq!(entry.string_value("mode").unwrap(), "fast");
//! ```
//!
//! ## Core Concepts
//!
//! - **Rules (`rule`, `overrides`)**: a typed base value plus ordered,
//!   non-overlapping version-range overrides.
//! - **Chambers (`chamber`)**: named rule sets, the unit of storage.
//! - **Storage (`storage`)**: byte-level CRUD over logical paths with
//!   memory and file backends, plus decorators for inheritance and
//!   write-through caching.
//! - **Configuration (`config`)**: picks a backend and composes the stack.

pub mod cancel;
pub mod chamber;
pub mod config;
pub mod defaults;
pub mod error;
pub mod overrides;
pub mod path;
pub mod rule;
pub mod storage;
pub mod version;

#[cfg(test)]
mod path_proptest;
