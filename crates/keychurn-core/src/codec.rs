//! Fixed-size binary record codec.
//!
//! A trace is a headerless sequence of 5-byte records:
//!
//! | offset | size | meaning                                   |
//! |--------|------|-------------------------------------------|
//! | 0      | 1    | tag: `+` insert, `?` lookup, `-` delete   |
//! | 1      | 4    | key, unsigned little-endian               |
//!
//! A well-formed trace of `n` records is therefore exactly `5 * n` bytes.
//!
//! - **Writer**: [`RecordWriter`] wraps any `Write` and keeps a record count so
//!   callers can check the length contract without re-reading the file.
//! - **Reader**: [`RecordReader`] *owns* its reader and yields
//!   `Result<OpRecord, DecodeError>`, surfacing unknown tags and a truncated
//!   tail as per-record errors.

use std::io::{self, ErrorKind, Read, Write};

use thiserror::Error;

use crate::types::{Key, OpKind, OpRecord};

/// Size of one encoded record in bytes.
pub const RECORD_LEN: usize = 5;

/// Errors produced while decoding a trace.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Tag byte is not one of `+`, `?`, `-`.
    #[error("invalid operation tag 0x{tag:02x} in record {index}")]
    InvalidTag {
        /// Zero-based record index.
        index: u64,
        /// Offending byte.
        tag: u8,
    },
    /// Input ended in the middle of a record.
    #[error("truncated record {index}: {dangling} trailing byte(s), expected 5")]
    Truncated {
        /// Zero-based index of the incomplete record.
        index: u64,
        /// Bytes present for that record (1..=4).
        dangling: usize,
    },
    /// Underlying reader failed.
    #[error("read failed at record {index}")]
    Io {
        /// Zero-based index of the record being read.
        index: u64,
        /// Source error.
        #[source]
        source: io::Error,
    },
}

impl OpRecord {
    /// Encode into the 5-byte wire form.
    #[inline]
    #[must_use]
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let k = self.key.to_le_bytes();
        [self.kind.tag(), k[0], k[1], k[2], k[3]]
    }

    /// Decode one 5-byte record. `index` is only used for error reporting.
    pub fn decode(buf: &[u8; RECORD_LEN], index: u64) -> Result<Self, DecodeError> {
        let kind = OpKind::from_tag(buf[0]).ok_or(DecodeError::InvalidTag { index, tag: buf[0] })?;
        let key = Key::from_le_bytes([buf[1], buf[2], buf[3], buf[4]]);
        Ok(Self { kind, key })
    }
}

/// Encode a slice of records into a freshly allocated buffer.
#[must_use]
pub fn encode_all(records: &[OpRecord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(records.len() * RECORD_LEN);
    for r in records {
        out.extend_from_slice(&r.encode());
    }
    out
}

/// Decode an in-memory trace. Fails on the first bad record.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<OpRecord>, DecodeError> {
    RecordReader::new(bytes).collect()
}

/* ---------------- Writer ---------------- */

/// Appends encoded records to an underlying writer.
///
/// Buffering is the caller's choice; wrap files in a `BufWriter`.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    inner: W,
    records: u64,
}

impl<W: Write> RecordWriter<W> {
    /// Wrap `inner`. Nothing is written until the first record.
    pub const fn new(inner: W) -> Self {
        Self { inner, records: 0 }
    }

    /// Encode and write a single record.
    #[inline]
    pub fn write_record(&mut self, rec: &OpRecord) -> io::Result<()> {
        self.inner.write_all(&rec.encode())?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    #[inline]
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Number of bytes written so far (`5 * records`).
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.records * RECORD_LEN as u64
    }

    /// Flush and hand back the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/* ---------------- Reader ---------------- */

/// Owning iterator over the records of a trace.
///
/// Stops after the first error so callers never see records past a
/// corrupted position.
#[derive(Debug)]
pub struct RecordReader<R: Read> {
    rdr: R,
    index: u64,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    /// Wrap `rdr`. For files, pass a `BufReader`.
    pub const fn new(rdr: R) -> Self {
        Self {
            rdr,
            index: 0,
            done: false,
        }
    }

    /// Records successfully yielded so far.
    #[inline]
    #[must_use]
    pub const fn records_read(&self) -> u64 {
        self.index
    }

    /// Fill `buf` unless EOF comes first; returns the byte count actually read.
    fn fill(&mut self, buf: &mut [u8; RECORD_LEN]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < RECORD_LEN {
            match self.rdr.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<OpRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let index = self.index;
        let mut buf = [0u8; RECORD_LEN];
        let item = match self.fill(&mut buf) {
            Ok(0) => {
                self.done = true;
                return None;
            }
            Ok(RECORD_LEN) => OpRecord::decode(&buf, index),
            Ok(dangling) => Err(DecodeError::Truncated { index, dangling }),
            Err(source) => Err(DecodeError::Io { index, source }),
        };
        match item {
            Ok(_) => self.index += 1,
            Err(_) => self.done = true,
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout_is_tag_then_le_key() {
        let r = OpRecord::insert(0x0403_0201);
        assert_eq!(r.encode(), [b'+', 0x01, 0x02, 0x03, 0x04]);
        assert_eq!(OpRecord::delete(1).encode(), [b'-', 1, 0, 0, 0]);
        assert_eq!(OpRecord::lookup(u32::MAX).encode(), [b'?', 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn writer_counts_records_and_bytes() {
        let mut w = RecordWriter::new(Vec::new());
        w.write_record(&OpRecord::insert(3)).unwrap();
        w.write_record(&OpRecord::lookup(3)).unwrap();
        assert_eq!(w.records(), 2);
        assert_eq!(w.bytes(), 10);
        let buf = w.finish().unwrap();
        assert_eq!(buf, encode_all(&[OpRecord::insert(3), OpRecord::lookup(3)]));
    }

    #[test]
    fn reader_reports_bad_tag_with_index() {
        let mut bytes = encode_all(&[OpRecord::insert(9), OpRecord::lookup(9)]);
        bytes[5] = b'!';
        let mut it = RecordReader::new(bytes.as_slice());
        assert_eq!(it.next().unwrap().unwrap(), OpRecord::insert(9));
        match it.next() {
            Some(Err(DecodeError::InvalidTag { index: 1, tag: b'!' })) => {}
            other => panic!("unexpected: {other:?}"),
        }
        assert!(it.next().is_none(), "reader must stop after an error");
    }

    #[test]
    fn reader_reports_truncated_tail() {
        let mut bytes = encode_all(&[OpRecord::insert(1)]);
        bytes.extend_from_slice(&[b'?', 1, 0]);
        let err = decode_all(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Truncated {
                index: 1,
                dangling: 3
            }
        ));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(decode_all(&[]).unwrap().is_empty());
    }

    /// A reader that hands out one byte at a time must still decode whole records.
    #[test]
    fn reader_tolerates_short_reads() {
        struct OneByte<'a>(&'a [u8]);
        impl Read for OneByte<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }

        let recs = vec![OpRecord::insert(42), OpRecord::delete(42)];
        let bytes = encode_all(&recs);
        let got: Vec<_> = RecordReader::new(OneByte(&bytes))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(got, recs);
    }
}
