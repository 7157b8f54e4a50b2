//! File helpers for binary traces.
//!
//! Thin wrappers that attach the path to every error so CLI messages stay
//! useful. Encoding itself lives in [`crate::codec`].

use crate::codec::{RecordReader, RecordWriter};
use crate::types::OpRecord;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Ensure the parent directory for a file exists (no-op if none).
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Open a trace for streaming reads.
pub fn open_trace<P: AsRef<Path>>(path: P) -> Result<RecordReader<BufReader<File>>> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", path_ref.display()))?;
    Ok(RecordReader::new(BufReader::new(f)))
}

/// Read a whole trace into memory.
pub fn read_trace<P: AsRef<Path>>(path: P) -> Result<Vec<OpRecord>> {
    let path_ref = path.as_ref();
    open_trace(path_ref)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("decode trace {}", path_ref.display()))
}

/// Write `records` as a trace, replacing any existing file.
pub fn write_trace<P: AsRef<Path>>(path: P, records: &[OpRecord]) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", path_ref.display()))?;
    let mut w = RecordWriter::new(BufWriter::new(f));
    for r in records {
        w.write_record(r)
            .with_context(|| format!("write {}", path_ref.display()))?;
    }
    w.finish()
        .with_context(|| format!("flush {}", path_ref.display()))?;
    Ok(())
}
