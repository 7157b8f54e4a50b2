#![no_main]
use keychurn_core::{audit_records, RecordReader};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = audit_records(RecordReader::new(data), None);
});
