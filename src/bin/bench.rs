//! EmDB Benchmark Harness
//!
//! Measures put/get/keys/sync throughput of every adapter.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use emdb::timing::Timer;
use emdb::{AdapterKind, EmDb, ExitSignal, Options};
use tracing_subscriber::{fmt, EnvFilter};

/// EmDB Benchmark
#[derive(Parser, Debug)]
#[command(name = "emdb-bench")]
#[command(about = "Throughput benchmark for EmDB adapters")]
#[command(version)]
struct Args {
    /// Records inserted per adapter
    #[arg(short = 'n', long, default_value = "100000")]
    samples: usize,

    /// Key length in bytes
    #[arg(short, long, default_value = "36")]
    key_size: usize,

    /// Value length in bytes
    #[arg(short = 'V', long, default_value = "1024")]
    value_size: usize,

    /// Scratch directory for store files
    #[arg(short, long, default_value = "./emdb-bench")]
    dir: PathBuf,

    /// Only run this adapter
    #[arg(short, long)]
    adapter: Option<AdapterKind>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    tracing::info!("EmDB Benchmark v{}", emdb::VERSION);

    if let Err(e) = run(&args) {
        tracing::error!("Benchmark failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> emdb::Result<()> {
    fs::create_dir_all(&args.dir)?;

    let kinds: Vec<AdapterKind> = match args.adapter {
        Some(kind) => vec![kind],
        None => AdapterKind::ALL.to_vec(),
    };

    for (idx, kind) in kinds.into_iter().enumerate() {
        let path = args.dir.join(format!("test_{}.db", idx));
        remove_path(&path)?;
        bench_adapter(kind, &path, args)?;
        remove_path(&path)?;
    }

    Ok(())
}

fn bench_adapter(kind: AdapterKind, path: &Path, args: &Args) -> emdb::Result<()> {
    tracing::info!(adapter = %kind, "Running benchmark");

    let mut init_timer = Timer::new("DB::init");
    let mut put_timer = Timer::new("DB::put");
    let mut get_timer = Timer::new("DB::get");
    let mut keys_timer = Timer::new("DB::keys");
    let mut sync_timer = Timer::new("DB::sync");

    // Private signal: the harness closes every store itself
    let exit = ExitSignal::new();
    let options = Options::builder().adapter(kind).append_if_exists(false).build();
    let db = init_timer.measure(|| EmDb::with_exit_signal(path, options, exit))?;

    for i in 0..args.samples {
        let key = sample_string(i, args.key_size);
        let value = sample_string(i.wrapping_mul(31), args.value_size);
        put_timer.measure(|| db.put(&key, value))?;
    }
    tracing::info!("{} records inserted", args.samples);

    let keys = keys_timer.measure(|| db.keys())?;
    for key in &keys {
        get_timer.measure(|| db.get(key))?;
    }
    tracing::info!("{} records read", keys.len());

    sync_timer.measure(|| db.sync())?;
    db.close()?;

    println!(
        "SUMMARY for {}:\n  * init: {}ms\n  * put: {}ms\n  * get: {}ms\n  * keys: {}ms\n  * sync: {}ms",
        kind,
        init_timer.avg_millis(),
        put_timer.avg_millis(),
        get_timer.avg_millis(),
        keys_timer.avg_millis(),
        sync_timer.avg_millis(),
    );

    Ok(())
}

/// Deterministic filename-safe string of `len` characters seeded by `seed`
fn sample_string(seed: usize, len: usize) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

    let prefix = format!("{:x}-", seed);
    let mut out = String::with_capacity(len.max(prefix.len()));
    out.push_str(&prefix);

    let mut state = seed as u64 ^ 0x9e37_79b9_7f4a_7c15;
    while out.len() < len {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.push(ALPHABET[(state % ALPHABET.len() as u64) as usize] as char);
    }
    out
}

fn remove_path(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
