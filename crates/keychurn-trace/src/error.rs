//! Generator error taxonomy: bad parameters or a failed destination.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors from [`crate::generator`]. Generation itself cannot fail.
#[derive(Debug, Error)]
pub enum GenError {
    /// Parameters rejected before any output was produced.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Destination could not be created.
    #[error("create {}", path.display())]
    Create {
        /// Destination path.
        path: PathBuf,
        /// Source error.
        #[source]
        source: io::Error,
    },
    /// Writing or flushing the destination failed.
    #[error("write failed after {records} record(s)")]
    Write {
        /// Records fully written before the failure.
        records: u64,
        /// Source error.
        #[source]
        source: io::Error,
    },
}
