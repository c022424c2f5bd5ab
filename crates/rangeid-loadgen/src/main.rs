//! Load-generation harness for the segmented ID allocator.
//!
//! Spawns caller threads hammering `get_id()` against an in-process counter
//! store, verifies that every returned ID is globally unique, persists the
//! sorted ID set to a file, and reports throughput.

use anyhow::Context;
use clap::Parser;
use rangeid::{AllocatorConfig, Error, IdAllocator, MemoryStore, StoreRangeProducer};
use std::{collections::HashSet, fs, path::PathBuf, sync::Arc, thread, time::Instant};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rangeid-loadgen", version, about)]
struct Args {
    /// Number of caller threads.
    #[arg(long, env = "LOADGEN_THREADS", default_value_t = 8)]
    threads: usize,

    /// IDs fetched per caller thread.
    #[arg(long, env = "LOADGEN_IDS_PER_THREAD", default_value_t = 10_000)]
    ids_per_thread: usize,

    /// Counter namespace.
    #[arg(long, default_value = "outgoing")]
    key_prefix: String,

    /// Sequence numbers reserved per round trip (also the buffer capacity).
    #[arg(long, default_value_t = 100)]
    reserve_count: u64,

    /// Number of background reservation threads.
    #[arg(long, default_value_t = 1)]
    producers: usize,

    /// File the sorted ID set is written to.
    #[arg(long, default_value = "ids.txt")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!(?args, "starting load run");

    let config = AllocatorConfig {
        key_prefix: args.key_prefix.clone(),
        reserve_count: args.reserve_count,
        producer_concurrency: args.producers,
        ..Default::default()
    };
    let allocator = Arc::new(IdAllocator::start(
        StoreRangeProducer::new(MemoryStore::new()),
        config,
    )?);

    let start = Instant::now();
    let handles: Vec<_> = (0..args.threads)
        .map(|worker| {
            let allocator = Arc::clone(&allocator);
            let count = args.ids_per_thread;
            thread::spawn(move || -> anyhow::Result<Vec<String>> {
                let mut ids = Vec::with_capacity(count);
                while ids.len() < count {
                    match allocator.get_id() {
                        Ok(id) => ids.push(id),
                        // Producers stalled briefly; keep asking.
                        Err(Error::Unavailable) => {}
                        Err(e) => anyhow::bail!("caller {worker}: {e}"),
                    }
                }
                Ok(ids)
            })
        })
        .collect();

    let total_expected = args.threads * args.ids_per_thread;
    let mut seen = HashSet::with_capacity(total_expected);
    for handle in handles {
        let ids = handle
            .join()
            .map_err(|_| anyhow::anyhow!("caller thread panicked"))??;
        for id in ids {
            anyhow::ensure!(!seen.contains(&id), "duplicate id generated: {id}");
            seen.insert(id);
        }
    }
    let elapsed = start.elapsed();
    anyhow::ensure!(
        seen.len() == total_expected,
        "expected {total_expected} unique ids, got {}",
        seen.len()
    );

    let mut sorted: Vec<String> = seen.into_iter().collect();
    sorted.sort_unstable();
    fs::write(&args.output, sorted.join("\n") + "\n")
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    let ids_per_sec = total_expected as f64 / elapsed.as_secs_f64();
    tracing::info!(
        total = total_expected,
        elapsed_ms = elapsed.as_millis() as u64,
        ids_per_sec = ids_per_sec as u64,
        output = %args.output.display(),
        "load run complete"
    );

    if let Some(allocator) = Arc::into_inner(allocator) {
        allocator.shutdown();
    }

    Ok(())
}
