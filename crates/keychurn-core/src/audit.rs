//! Trace audit: lifecycle well-formedness plus per-kind counters.
//!
//! The auditor walks a trace against a reference map of live keys and checks
//! that each record is legal for the key's current state:
//!
//! - `+` only for an absent key (starts its lookup count at 0),
//! - `?` only for a present key (bumps its lookup count),
//! - `-` only for a present key (ends its lifecycle).
//!
//! With a known ceiling it additionally checks that every `-` follows exactly
//! `max_lookups` lookups since the matching `+`, and that no `?` overshoots.
//!
//! This is not a table benchmark; it only confirms that a trace obeys the
//! generator's own contract before a harness spends time replaying it.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::codec::DecodeError;
use crate::types::{Key, LookupCount, OpKind, OpRecord};

/// A record that is not legal for its key's current state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Violation {
    /// `+` for a key that is already live.
    #[error("record {index}: insert of live key {key}")]
    InsertLive {
        /// Zero-based record index.
        index: u64,
        /// Offending key.
        key: Key,
    },
    /// `?` or `-` for a key that is not live.
    #[error("record {index}: {kind} of absent key {key}")]
    Absent {
        /// Zero-based record index.
        index: u64,
        /// `Lookup` or `Delete`.
        kind: OpKind,
        /// Offending key.
        key: Key,
    },
    /// `-` issued before the key reached its lookup ceiling.
    #[error("record {index}: delete of key {key} after {lookups} lookup(s), ceiling is {ceiling}")]
    EarlyDelete {
        /// Zero-based record index.
        index: u64,
        /// Offending key.
        key: Key,
        /// Lookups seen since the matching insert.
        lookups: LookupCount,
        /// Configured ceiling.
        ceiling: LookupCount,
    },
    /// `?` beyond the lookup ceiling (a delete was due).
    #[error("record {index}: lookup of key {key} past ceiling {ceiling}")]
    PastCeiling {
        /// Zero-based record index.
        index: u64,
        /// Offending key.
        key: Key,
        /// Configured ceiling.
        ceiling: LookupCount,
    },
}

/// Errors returned by [`audit_records`].
#[derive(Debug, Error)]
pub enum AuditError {
    /// The trace could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The trace decoded but broke a lifecycle rule.
    #[error(transparent)]
    Violation(#[from] Violation),
}

/// Summary of an audited trace.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct AuditReport {
    /// Total records.
    pub records: u64,
    /// `+` records.
    pub inserts: u64,
    /// `?` records.
    pub lookups: u64,
    /// `-` records.
    pub deletes: u64,
    /// Distinct keys that appeared at least once.
    pub distinct_keys: u64,
    /// Keys still live after the last record.
    pub live_keys_at_end: u64,
    /// Largest number of simultaneously live keys.
    pub peak_live_keys: u64,
}

impl AuditReport {
    /// Count for one operation kind.
    #[must_use]
    pub const fn count(&self, kind: OpKind) -> u64 {
        match kind {
            OpKind::Insert => self.inserts,
            OpKind::Lookup => self.lookups,
            OpKind::Delete => self.deletes,
        }
    }
}

/// Incremental auditor; feed records in trace order with [`Auditor::observe`].
#[derive(Debug, Default)]
pub struct Auditor {
    ceiling: Option<LookupCount>,
    live: HashMap<Key, LookupCount>,
    seen: HashSet<Key>,
    report: AuditReport,
}

impl Auditor {
    /// New auditor. Pass `Some(max_lookups)` to enforce the ceiling rules.
    #[must_use]
    pub fn new(ceiling: Option<LookupCount>) -> Self {
        Self {
            ceiling,
            ..Self::default()
        }
    }

    /// Check one record and fold it into the running report.
    pub fn observe(&mut self, rec: OpRecord) -> Result<(), Violation> {
        let index = self.report.records;
        let key = rec.key;

        match rec.kind {
            OpKind::Insert => {
                if self.live.insert(key, 0).is_some() {
                    return Err(Violation::InsertLive { index, key });
                }
                self.report.inserts += 1;
            }
            OpKind::Lookup => {
                let count = self.live.get_mut(&key).ok_or(Violation::Absent {
                    index,
                    kind: OpKind::Lookup,
                    key,
                })?;
                if let Some(ceiling) = self.ceiling {
                    if *count >= ceiling {
                        return Err(Violation::PastCeiling {
                            index,
                            key,
                            ceiling,
                        });
                    }
                }
                *count = count.saturating_add(1);
                self.report.lookups += 1;
            }
            OpKind::Delete => {
                let lookups = self.live.remove(&key).ok_or(Violation::Absent {
                    index,
                    kind: OpKind::Delete,
                    key,
                })?;
                if let Some(ceiling) = self.ceiling {
                    if lookups != ceiling {
                        return Err(Violation::EarlyDelete {
                            index,
                            key,
                            lookups,
                            ceiling,
                        });
                    }
                }
                self.report.deletes += 1;
            }
        }

        if self.seen.insert(key) {
            self.report.distinct_keys += 1;
        }
        self.report.records += 1;
        let live = self.live.len() as u64;
        self.report.peak_live_keys = self.report.peak_live_keys.max(live);
        Ok(())
    }

    /// Finish and return the report.
    #[must_use]
    pub fn finish(mut self) -> AuditReport {
        self.report.live_keys_at_end = self.live.len() as u64;
        self.report
    }
}

/// Audit a whole stream of decoded records (e.g. a [`crate::codec::RecordReader`]).
///
/// Stops at the first decode error or lifecycle violation.
pub fn audit_records<I>(records: I, ceiling: Option<LookupCount>) -> Result<AuditReport, AuditError>
where
    I: IntoIterator<Item = Result<OpRecord, DecodeError>>,
{
    let mut auditor = Auditor::new(ceiling);
    for rec in records {
        auditor.observe(rec?)?;
    }
    let report = auditor.finish();
    tracing::debug!(
        records = report.records,
        inserts = report.inserts,
        lookups = report.lookups,
        deletes = report.deletes,
        "audit complete"
    );
    Ok(report)
}
