//! Synthetic hash-table workload generator.
//!
//! This crate turns a handful of parameters into a binary trace of
//! insert/lookup/delete operations:
//!
//! - `config`: run parameters (`GenConfig`), validation, and TOML profiles.
//! - `ledger`: the per-key lifecycle state machine (`KeyLedger`).
//! - `generator`: the seeded draw loop and file/writer entry points.
//! - `error`: the `GenError` taxonomy (configuration vs. destination I/O).
//!
//! The record format and audit live in `keychurn-core`.
//!
//! ```
//! use keychurn_trace::{config::GenConfig, generator::generate_seeded};
//!
//! let cfg = GenConfig { num_operations: 3, key_max: 2, max_lookups_per_key: 1 };
//! let recs = generate_seeded(&cfg, 7)?;
//! assert_eq!(recs.iter().map(ToString::to_string).collect::<Vec<_>>(), ["+1", "?1", "-1"]);
//! # Ok::<(), keychurn_trace::error::GenError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

/// Run parameters and profiles.
pub mod config;
/// Generator error taxonomy.
pub mod error;
/// Seeded trace generator.
pub mod generator;
/// Per-key lifecycle state machine.
pub mod ledger;

// (Intentionally no broad re-exports so downstream callers import
// stable module paths like `keychurn_trace::generator::generate_to_path`.)
