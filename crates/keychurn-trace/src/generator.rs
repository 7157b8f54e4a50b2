// crates/keychurn-trace/src/generator.rs

//! Seeded insert/lookup/delete trace generator.
//!
//! Each step draws a key uniformly from `[1, key_max)`, advances that key in
//! a [`KeyLedger`], and emits the resulting record. The random source is
//! passed in by the caller, so a seeded `StdRng` makes runs byte-for-byte
//! reproducible.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use keychurn_core::{Key, OpKind, OpRecord, RecordWriter};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::GenConfig;
use crate::error::GenError;
use crate::ledger::KeyLedger;

/// Emit a progress event every this many records.
const PROGRESS_EVERY: u64 = 1 << 22;

/// Counters for a finished run.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct TraceSummary {
    /// Records written (equals `num_operations`).
    pub records: u64,
    /// Bytes written (`5 * records`).
    pub bytes: u64,
    /// `+` records.
    pub inserts: u64,
    /// `?` records.
    pub lookups: u64,
    /// `-` records.
    pub deletes: u64,
    /// Keys still live when the run ended.
    pub live_keys_at_end: u64,
}

impl TraceSummary {
    fn tally(&mut self, kind: OpKind) {
        match kind {
            OpKind::Insert => self.inserts += 1,
            OpKind::Lookup => self.lookups += 1,
            OpKind::Delete => self.deletes += 1,
        }
    }
}

/// Iterator yielding exactly `num_operations` records.
#[derive(Debug)]
pub struct TraceGenerator<R> {
    rng: R,
    ledger: KeyLedger,
    key_max: Key,
    remaining: u64,
}

impl<R: Rng> TraceGenerator<R> {
    /// Validate `cfg` and set up an empty ledger sized for the run.
    pub fn new(cfg: &GenConfig, rng: R) -> Result<Self, GenError> {
        cfg.validate()?;
        Ok(Self {
            rng,
            ledger: KeyLedger::with_capacity(cfg.max_lookups_per_key, cfg.live_key_bound()),
            key_max: cfg.key_max,
            remaining: cfg.num_operations,
        })
    }

    /// Current key state.
    #[inline]
    #[must_use]
    pub const fn ledger(&self) -> &KeyLedger {
        &self.ledger
    }

    /// Records still to be produced.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<R: Rng> Iterator for TraceGenerator<R> {
    type Item = OpRecord;

    #[inline]
    fn next(&mut self) -> Option<OpRecord> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let key = self.rng.random_range(1..self.key_max);
        let kind = self.ledger.step(key);
        Some(OpRecord::new(kind, key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (n, usize::try_from(self.remaining).ok())
    }
}

/// Generate a trace into `out`, writing each record as soon as it is decided.
///
/// Buffering is up to `out`. The writer is flushed before returning, and a
/// flush failure is reported as a write failure.
pub fn generate_to_writer<R, W>(cfg: &GenConfig, rng: R, out: W) -> Result<TraceSummary, GenError>
where
    R: Rng,
    W: Write,
{
    let mut trace = TraceGenerator::new(cfg, rng)?;
    let mut w = RecordWriter::new(out);
    let mut summary = TraceSummary::default();

    while let Some(rec) = trace.next() {
        w.write_record(&rec).map_err(|source| GenError::Write {
            records: w.records(),
            source,
        })?;
        summary.tally(rec.kind);
        if w.records() % PROGRESS_EVERY == 0 {
            debug!(
                written = w.records(),
                live = trace.ledger().live(),
                "generation progress"
            );
        }
    }

    summary.records = w.records();
    summary.bytes = w.bytes();
    summary.live_keys_at_end = trace.ledger().live() as u64;
    w.finish().map_err(|source| GenError::Write {
        records: summary.records,
        source,
    })?;
    Ok(summary)
}

/// Generate a trace into a file at `path`, replacing any existing file.
///
/// The configuration is validated before the file is created, so a rejected
/// configuration never leaves an empty file behind.
pub fn generate_to_path<R: Rng>(
    cfg: &GenConfig,
    rng: R,
    path: &Path,
) -> Result<TraceSummary, GenError> {
    cfg.validate()?;
    info!(
        num_operations = cfg.num_operations,
        key_max = cfg.key_max,
        max_lookups_per_key = cfg.max_lookups_per_key,
        path = %path.display(),
        "generating trace"
    );

    let f = File::create(path).map_err(|source| GenError::Create {
        path: path.to_owned(),
        source,
    })?;
    let summary = generate_to_writer(cfg, rng, BufWriter::new(f))?;

    info!(
        records = summary.records,
        bytes = summary.bytes,
        inserts = summary.inserts,
        lookups = summary.lookups,
        deletes = summary.deletes,
        "trace written"
    );
    Ok(summary)
}

/// Generate an in-memory trace from a `u64` seed (tests, benches, small runs).
pub fn generate_seeded(cfg: &GenConfig, seed: u64) -> Result<Vec<OpRecord>, GenError> {
    Ok(TraceGenerator::new(cfg, StdRng::seed_from_u64(seed))?.collect())
}
