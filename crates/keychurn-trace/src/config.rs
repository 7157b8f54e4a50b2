// crates/keychurn-trace/src/config.rs

//! Generator parameters, validation, and TOML profiles.

use std::fs;
use std::path::{Path, PathBuf};

use keychurn_core::{Key, LookupCount};
use serde::Deserialize;
use thiserror::Error;

/// Default number of records in a trace.
pub const DEFAULT_NUM_OPERATIONS: u64 = 20_000_000;
/// Default exclusive upper bound for drawn keys.
pub const DEFAULT_KEY_MAX: Key = 250_000;
/// Default lookups a key receives before it is deleted.
pub const DEFAULT_MAX_LOOKUPS_PER_KEY: LookupCount = 30;
/// Default output path used by the CLI.
pub const DEFAULT_TRACE_FILE: &str = "benchmark.out";

/// Parameters for one generator run.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// Records to emit (`N`). Zero yields an empty trace.
    #[serde(alias = "num_operation")]
    pub num_operations: u64,
    /// Keys are drawn uniformly from `[1, key_max)`; must be at least 2.
    pub key_max: Key,
    /// Lookups a key receives between its insert and its delete.
    pub max_lookups_per_key: LookupCount,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            num_operations: DEFAULT_NUM_OPERATIONS,
            key_max: DEFAULT_KEY_MAX,
            max_lookups_per_key: DEFAULT_MAX_LOOKUPS_PER_KEY,
        }
    }
}

/// Rejected parameter values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The draw range `[1, key_max)` would be empty.
    #[error("key_max must be at least 2 so that [1, key_max) is non-empty (got {0})")]
    KeyMaxTooSmall(Key),
}

/// Failure to load a profile file.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// File could not be read.
    #[error("read profile {}", path.display())]
    Read {
        /// Profile path.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
    /// File is not valid TOML for a [`Profile`].
    #[error("parse profile {}", path.display())]
    Parse {
        /// Profile path (`<inline>` for string input).
        path: PathBuf,
        /// Source error.
        #[source]
        source: toml::de::Error,
    },
}

impl GenConfig {
    /// Check parameters before any output is produced.
    ///
    /// `num_operations` and `max_lookups_per_key` are unsigned, so every
    /// value they can hold is valid.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.key_max < 2 {
            return Err(ConfigError::KeyMaxTooSmall(self.key_max));
        }
        Ok(())
    }

    /// Number of distinct keys that can be drawn.
    #[inline]
    #[must_use]
    pub const fn key_space(&self) -> u32 {
        self.key_max.saturating_sub(1)
    }

    /// Upper bound on simultaneously live keys: `min(key_max - 1, N)`.
    #[must_use]
    pub fn live_key_bound(&self) -> usize {
        let by_ops = usize::try_from(self.num_operations).unwrap_or(usize::MAX);
        let by_keys = usize::try_from(self.key_space()).unwrap_or(usize::MAX);
        by_ops.min(by_keys)
    }
}

/// A named set of run parameters loaded from TOML.
///
/// ```toml
/// num_operations = 1000000
/// key_max = 65536
/// max_lookups_per_key = 8
/// file = "traces/small.out"
/// seed = 7
/// ```
///
/// Omitted generator fields take their defaults; unknown keys are rejected.
/// `num_operation` is accepted as a spelling of `num_operations`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(from = "ProfileFile")]
pub struct Profile {
    /// Generator parameters.
    pub gen: GenConfig,
    /// Output path override.
    pub file: Option<PathBuf>,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
}

/// On-disk profile layout. Kept flat so unknown keys can be refused.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProfileFile {
    #[serde(alias = "num_operation")]
    num_operations: u64,
    key_max: Key,
    max_lookups_per_key: LookupCount,
    file: Option<PathBuf>,
    seed: Option<u64>,
}

impl Default for ProfileFile {
    fn default() -> Self {
        let gen = GenConfig::default();
        Self {
            num_operations: gen.num_operations,
            key_max: gen.key_max,
            max_lookups_per_key: gen.max_lookups_per_key,
            file: None,
            seed: None,
        }
    }
}

impl From<ProfileFile> for Profile {
    fn from(raw: ProfileFile) -> Self {
        Self {
            gen: GenConfig {
                num_operations: raw.num_operations,
                key_max: raw.key_max,
                max_lookups_per_key: raw.max_lookups_per_key,
            },
            file: raw.file,
            seed: raw.seed,
        }
    }
}

impl Profile {
    /// Parse a profile from TOML text.
    pub fn from_toml_str(src: &str) -> Result<Self, ProfileError> {
        toml::from_str(src).map_err(|source| ProfileError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Read and parse a profile file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&src).map_err(|source| ProfileError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_generator() {
        let c = GenConfig::default();
        assert_eq!(c.num_operations, 20_000_000);
        assert_eq!(c.key_max, 250_000);
        assert_eq!(c.max_lookups_per_key, 30);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn key_max_below_two_is_rejected() {
        for key_max in [0, 1] {
            let c = GenConfig {
                key_max,
                ..GenConfig::default()
            };
            assert_eq!(c.validate(), Err(ConfigError::KeyMaxTooSmall(key_max)));
        }
        let c = GenConfig {
            num_operations: 0,
            key_max: 2,
            max_lookups_per_key: 0,
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn live_key_bound_is_min_of_ops_and_keys() {
        let c = GenConfig {
            num_operations: 10,
            key_max: 1_000,
            max_lookups_per_key: 1,
        };
        assert_eq!(c.live_key_bound(), 10);
        let c = GenConfig {
            num_operations: 10_000,
            key_max: 11,
            max_lookups_per_key: 1,
        };
        assert_eq!(c.live_key_bound(), 10);
    }

    #[test]
    fn profile_fills_missing_fields_with_defaults() {
        let p = Profile::from_toml_str("key_max = 64\nseed = 9\n").unwrap();
        assert_eq!(p.gen.key_max, 64);
        assert_eq!(p.gen.num_operations, DEFAULT_NUM_OPERATIONS);
        assert_eq!(p.gen.max_lookups_per_key, DEFAULT_MAX_LOOKUPS_PER_KEY);
        assert_eq!(p.seed, Some(9));
        assert_eq!(p.file, None);
    }

    #[test]
    fn profile_rejects_unknown_keys() {
        let err = Profile::from_toml_str("num_operatons = 5\n").unwrap_err();
        match err {
            ProfileError::Parse { source, .. } => {
                assert!(source.to_string().contains("num_operatons"), "{source}");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(Profile::from_toml_str("[gen]\nkey_max = 4\n").is_err());
    }

    #[test]
    fn profile_accepts_singular_num_operation() {
        let p = Profile::from_toml_str("num_operation = 5\n").unwrap();
        assert_eq!(p.gen.num_operations, 5);
        assert_eq!(p.gen.key_max, DEFAULT_KEY_MAX);

        let c: GenConfig = toml::from_str("num_operation = 7\n").unwrap();
        assert_eq!(c.num_operations, 7);
        assert!(toml::from_str::<GenConfig>("seeds = 1\n").is_err());
    }

    #[test]
    fn profile_rejects_negative_values() {
        let err = Profile::from_toml_str("max_lookups_per_key = -1").unwrap_err();
        assert!(matches!(err, ProfileError::Parse { .. }));
    }

    #[test]
    fn profile_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.toml");
        fs::write(
            &path,
            "num_operations = 100\nkey_max = 8\nmax_lookups_per_key = 2\nfile = \"x.out\"\n",
        )
        .unwrap();
        let p = Profile::from_toml_file(&path).unwrap();
        assert_eq!(
            p.gen,
            GenConfig {
                num_operations: 100,
                key_max: 8,
                max_lookups_per_key: 2
            }
        );
        assert_eq!(p.file, Some(PathBuf::from("x.out")));

        let err = Profile::from_toml_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ProfileError::Read { .. }));
    }
}
