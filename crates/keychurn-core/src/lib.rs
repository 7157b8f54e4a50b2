//! keychurn-core — trace records, the 5-byte codec, and trace audit.
//!
//! This crate defines the **stable boundary** shared by the generator and the
//! CLI:
//! - canonical types (`Key`, `OpKind`, `OpRecord`),
//! - the fixed-size binary codec with streaming reader/writer,
//! - a lifecycle auditor that checks a trace against a reference map, and
//! - path-aware file helpers.
//!
//! ```
//! use keychurn_core::{codec::decode_all, OpRecord};
//!
//! let bytes = [b'+', 1, 0, 0, 0, b'-', 1, 0, 0, 0];
//! let recs = decode_all(&bytes)?;
//! assert_eq!(recs, vec![OpRecord::insert(1), OpRecord::delete(1)]);
//! # Ok::<(), keychurn_core::codec::DecodeError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Lifecycle audit of a decoded trace.
pub mod audit;
/// 5-byte record encoding, `RecordWriter` and `RecordReader`.
pub mod codec;
/// Path-aware trace file helpers.
pub mod io;
/// Canonical trace types.
pub mod types;

pub use audit::{audit_records, AuditError, AuditReport, Auditor, Violation};
pub use codec::{DecodeError, RecordReader, RecordWriter, RECORD_LEN};
pub use types::*;
