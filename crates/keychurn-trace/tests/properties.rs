//! End-to-end properties of generated traces: length, lifecycle legality,
//! exact lookup ceiling, and seed determinism.

use std::collections::HashMap;
use std::fs;

use keychurn_core::{audit_records, io::read_trace, OpKind, OpRecord, RecordReader};
use keychurn_trace::{
    config::GenConfig,
    error::GenError,
    generator::{generate_seeded, generate_to_path, generate_to_writer},
};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

fn cfg(num_operations: u64, key_max: u32, max_lookups_per_key: u32) -> GenConfig {
    GenConfig {
        num_operations,
        key_max,
        max_lookups_per_key,
    }
}

fn to_bytes(cfg: &GenConfig, seed: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    generate_to_writer(cfg, StdRng::seed_from_u64(seed), &mut buf).unwrap();
    buf
}

/// Lookups seen between each `+` and its matching `-`, per completed lifecycle.
fn completed_lifecycles(recs: &[OpRecord]) -> Vec<u32> {
    let mut open: HashMap<u32, u32> = HashMap::new();
    let mut done = Vec::new();
    for r in recs {
        match r.kind {
            OpKind::Insert => {
                open.insert(r.key, 0);
            }
            OpKind::Lookup => *open.get_mut(&r.key).unwrap() += 1,
            OpKind::Delete => done.push(open.remove(&r.key).unwrap()),
        }
    }
    done
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn length_is_five_bytes_per_operation(
        n in 0u64..2_000,
        key_max in 2u32..300,
        ceiling in 0u32..10,
        seed in any::<u64>(),
    ) {
        let bytes = to_bytes(&cfg(n, key_max, ceiling), seed);
        prop_assert_eq!(bytes.len() as u64, 5 * n);
    }

    #[test]
    fn traces_pass_the_lifecycle_audit(
        n in 0u64..3_000,
        key_max in 2u32..64,
        ceiling in 0u32..8,
        seed in any::<u64>(),
    ) {
        let bytes = to_bytes(&cfg(n, key_max, ceiling), seed);
        let rep = audit_records(RecordReader::new(bytes.as_slice()), Some(ceiling)).unwrap();
        prop_assert_eq!(rep.records, n);
        prop_assert!(rep.distinct_keys <= u64::from(key_max - 1));
    }

    #[test]
    fn every_completed_lifecycle_has_exactly_ceiling_lookups(
        key_max in 2u32..16,
        ceiling in 0u32..6,
        seed in any::<u64>(),
    ) {
        let recs = generate_seeded(&cfg(2_000, key_max, ceiling), seed).unwrap();
        for lookups in completed_lifecycles(&recs) {
            prop_assert_eq!(lookups, ceiling);
        }
    }

    #[test]
    fn same_seed_same_bytes(seed in any::<u64>()) {
        let c = cfg(1_500, 40, 3);
        prop_assert_eq!(to_bytes(&c, seed), to_bytes(&c, seed));
    }
}

#[test]
fn different_seeds_diverge() {
    let c = cfg(1_000, 1_000, 3);
    assert_ne!(to_bytes(&c, 1), to_bytes(&c, 2));
}

#[test]
fn zero_operations_writes_an_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.out");
    let s = generate_to_path(&cfg(0, 250_000, 30), StdRng::seed_from_u64(0), &path).unwrap();
    assert_eq!(s.records, 0);
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn single_key_end_to_end_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("single.out");
    generate_to_path(&cfg(5, 2, 2), StdRng::seed_from_u64(5), &path).unwrap();

    let raw = fs::read(&path).unwrap();
    assert_eq!(raw.len(), 25);
    assert_eq!(&raw[..5], b"+\x01\x00\x00\x00");
    let shown: Vec<String> = read_trace(&path)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(shown, ["+1", "?1", "?1", "-1", "+1"]);
}

#[test]
fn zero_ceiling_two_draws_of_single_key() {
    let recs = generate_seeded(&cfg(2, 2, 0), 0).unwrap();
    assert_eq!(recs, [OpRecord::insert(1), OpRecord::delete(1)]);
}

#[test]
fn rejected_config_creates_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.out");
    let err = generate_to_path(&cfg(10, 1, 3), StdRng::seed_from_u64(0), &path).unwrap_err();
    assert!(matches!(err, GenError::Config(_)));
    assert!(!path.exists());
}

#[test]
fn unwritable_destination_is_a_create_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("t.out");
    let err = generate_to_path(&cfg(10, 8, 3), StdRng::seed_from_u64(0), &path).unwrap_err();
    assert!(matches!(err, GenError::Create { .. }));
}
