// crates/keychurn-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keychurn_core::{audit_records, io::ensure_parent_dir, io::open_trace, AuditReport};
use keychurn_trace::config::{GenConfig, Profile, DEFAULT_TRACE_FILE};
use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "keychurn-cli",
    about = "Hash-table benchmark trace generator",
    long_about = "Hash-table benchmark trace generator.\n\nGenerates a binary trace of insert (+), lookup (?) and delete (-) records, 5 bytes each, and audits existing traces.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Generate a trace file.
    /// Flags override values loaded from --profile.
    Generate {
        /// Number of operations to generate [default: 20000000]
        #[arg(long, alias = "num-operation")]
        num_operations: Option<u64>,

        /// Keys are drawn from [1, key-max) [default: 250000]
        #[arg(long)]
        key_max: Option<u32>,

        /// Lookups a key receives before it is deleted [default: 30]
        #[arg(long)]
        max_lookups_per_key: Option<u32>,

        /// Output trace path [default: benchmark.out]
        #[arg(long)]
        file: Option<PathBuf>,

        /// RNG seed; drawn from OS entropy (and logged) when omitted
        #[arg(long)]
        seed: Option<u64>,

        /// TOML profile with defaults for the flags above
        #[arg(long)]
        profile: Option<PathBuf>,
    },

    /// Check a trace against the insert/lookup/delete lifecycle and print counts
    Audit {
        /// Input trace path
        #[arg(long, default_value = DEFAULT_TRACE_FILE)]
        file: PathBuf,

        /// Also require exactly this many lookups between each insert and delete
        #[arg(long)]
        max_lookups_per_key: Option<u32>,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Resolved `generate` arguments.
#[derive(Debug)]
struct GenerateArgs {
    cfg: GenConfig,
    file: PathBuf,
    seed: Option<u64>,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Generate {
            num_operations,
            key_max,
            max_lookups_per_key,
            file,
            seed,
            profile,
        } => {
            let mut base = match profile {
                Some(path) => Profile::from_toml_file(&path)
                    .with_context(|| format!("loading profile {}", path.display()))?,
                None => Profile::default(),
            };
            if let Some(n) = num_operations {
                base.gen.num_operations = n;
            }
            if let Some(k) = key_max {
                base.gen.key_max = k;
            }
            if let Some(m) = max_lookups_per_key {
                base.gen.max_lookups_per_key = m;
            }
            generate(GenerateArgs {
                cfg: base.gen,
                file: file
                    .or(base.file)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_TRACE_FILE)),
                seed: seed.or(base.seed),
            })
        }

        Cmd::Audit {
            file,
            max_lookups_per_key,
            json,
        } => audit(file, max_lookups_per_key, json),
    }
}

/// Initialize tracing with an env-driven filter (default INFO), on stderr.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn generate(args: GenerateArgs) -> Result<()> {
    use keychurn_trace::generator::generate_to_path;

    let GenerateArgs { cfg, file, seed } = args;

    // Reject bad parameters before touching the filesystem.
    cfg.validate().context("invalid generator configuration")?;

    let seed = seed.unwrap_or_else(rand::random::<u64>);
    info!(seed, "seeding generator");

    ensure_parent_dir(&file)?;
    let summary = generate_to_path(&cfg, StdRng::seed_from_u64(seed), &file)
        .with_context(|| format!("generating trace into {}", file.display()))?;

    println!(
        "Generated {} records ({} bytes): +{} ?{} -{}, seed={} → {}",
        summary.records,
        summary.bytes,
        summary.inserts,
        summary.lookups,
        summary.deletes,
        seed,
        file.display()
    );
    Ok(())
}

fn audit(file: PathBuf, max_lookups_per_key: Option<u32>, json: bool) -> Result<()> {
    info!(file=%file.display(), ?max_lookups_per_key, "auditing trace");
    let mut reader = open_trace(&file)?;
    let report = audit_records(reader.by_ref(), max_lookups_per_key);
    let report = report.with_context(|| {
        format!(
            "auditing {} (stopped after {} records)",
            file.display(),
            reader.records_read()
        )
    })?;

    if json {
        let out = serde_json::to_string_pretty(&report).context("serialize audit report")?;
        println!("{out}");
    } else {
        print_report(&file, &report);
    }
    Ok(())
}

fn print_report(file: &std::path::Path, r: &AuditReport) {
    println!("OK: {} is a well-formed trace", file.display());
    println!("  records          {}", r.records);
    println!("  inserts (+)      {}", r.inserts);
    println!("  lookups (?)      {}", r.lookups);
    println!("  deletes (-)      {}", r.deletes);
    println!("  distinct keys    {}", r.distinct_keys);
    println!("  peak live keys   {}", r.peak_live_keys);
    println!("  live at end      {}", r.live_keys_at_end);
}
