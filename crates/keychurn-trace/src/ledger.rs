//! Per-key lifecycle state machine.
//!
//! A key is either absent or live with a lookup count in `[0, ceiling]`.
//! Each draw advances exactly one key:
//!
//! ```text
//!   absent ──+──▶ live(0) ──?──▶ live(1) ──?──▶ … live(ceiling) ──-──▶ absent
//! ```

use std::collections::hash_map::{Entry, HashMap};

use keychurn_core::{Key, LookupCount, OpKind};

/// Lookup counts of the keys currently live in the simulated table.
#[derive(Clone, Debug)]
pub struct KeyLedger {
    ceiling: LookupCount,
    counts: HashMap<Key, LookupCount>,
}

impl KeyLedger {
    /// Empty ledger for the given lookup ceiling.
    #[must_use]
    pub fn new(ceiling: LookupCount) -> Self {
        Self::with_capacity(ceiling, 0)
    }

    /// Empty ledger pre-sized for `capacity` live keys.
    #[must_use]
    pub fn with_capacity(ceiling: LookupCount, capacity: usize) -> Self {
        Self {
            ceiling,
            counts: HashMap::with_capacity(capacity),
        }
    }

    /// Advance `key` one transition and report which operation that was.
    #[inline]
    pub fn step(&mut self, key: Key) -> OpKind {
        match self.counts.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(0);
                OpKind::Insert
            }
            Entry::Occupied(slot) if *slot.get() >= self.ceiling => {
                debug_assert_eq!(*slot.get(), self.ceiling, "lookup count overshot ceiling");
                slot.remove();
                OpKind::Delete
            }
            Entry::Occupied(mut slot) => {
                *slot.get_mut() += 1;
                OpKind::Lookup
            }
        }
    }

    /// Lookup count of `key`, or `None` if it is not live.
    #[inline]
    #[must_use]
    pub fn lookups(&self, key: Key) -> Option<LookupCount> {
        self.counts.get(&key).copied()
    }

    /// Whether `key` is live.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.counts.contains_key(&key)
    }

    /// Number of live keys.
    #[inline]
    #[must_use]
    pub fn live(&self) -> usize {
        self.counts.len()
    }

    /// The configured lookup ceiling.
    #[inline]
    #[must_use]
    pub const fn ceiling(&self) -> LookupCount {
        self.ceiling
    }
}
