//! Canonical trace types shared across the keychurn workspace.
//!
//! These are re-exported at the crate root so other crates can import via
//! `keychurn_core::OpRecord`, `keychurn_core::OpKind`, etc.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulated hash-table key. Always encoded as 4 little-endian bytes.
pub type Key = u32;

/// Lookup count held for a key while it is live in the simulated table.
pub type LookupCount = u32;

/// Operation kind carried by every trace record.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// Key transitions from absent to present.
    Insert,
    /// Key is present and below its lookup ceiling.
    Lookup,
    /// Key is present at its lookup ceiling and gets removed.
    Delete,
}

impl OpKind {
    /// All kinds, in tag order `+`, `?`, `-`.
    pub const ALL: [Self; 3] = [Self::Insert, Self::Lookup, Self::Delete];

    /// ASCII tag byte used on the wire.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Insert => b'+',
            Self::Lookup => b'?',
            Self::Delete => b'-',
        }
    }

    /// Inverse of [`OpKind::tag`]; `None` for any other byte.
    #[inline]
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'+' => Some(Self::Insert),
            b'?' => Some(Self::Lookup),
            b'-' => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Insert => "insert",
            Self::Lookup => "lookup",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One trace record: an operation applied to a single key.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OpRecord {
    /// What happens to `key`.
    pub kind: OpKind,
    /// The key in question.
    pub key: Key,
}

impl OpRecord {
    /// Construct a record.
    #[inline]
    #[must_use]
    pub const fn new(kind: OpKind, key: Key) -> Self {
        Self { kind, key }
    }

    /// `Insert(key)`.
    #[inline]
    #[must_use]
    pub const fn insert(key: Key) -> Self {
        Self::new(OpKind::Insert, key)
    }

    /// `Lookup(key)`.
    #[inline]
    #[must_use]
    pub const fn lookup(key: Key) -> Self {
        Self::new(OpKind::Lookup, key)
    }

    /// `Delete(key)`.
    #[inline]
    #[must_use]
    pub const fn delete(key: Key) -> Self {
        Self::new(OpKind::Delete, key)
    }
}

/// Renders as the tag character followed by the key, e.g. `+17`.
impl fmt::Display for OpRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", char::from(self.kind.tag()), self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_distinct_and_invert() {
        for kind in OpKind::ALL {
            assert_eq!(OpKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(OpKind::from_tag(b'x'), None);
        assert_eq!(OpKind::from_tag(0), None);
    }

    #[test]
    fn display_uses_wire_tag() {
        assert_eq!(OpRecord::insert(1).to_string(), "+1");
        assert_eq!(OpRecord::lookup(250).to_string(), "?250");
        assert_eq!(OpRecord::delete(7).to_string(), "-7");
    }
}
