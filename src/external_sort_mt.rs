//! Multi-threaded external sort: partitions the input into
//! `T = hardware_concurrency + 2` record-aligned shards, runs the
//! run-producer/merger pair once per shard on its own thread, then merges
//! the `T` per-thread outputs. Uses `command-executor`'s thread pool
//! (`ThreadPoolBuilder`, `ShutdownMode::CompletePending`,
//! `submit`/`shutdown`/`join`) for the per-shard work.
//!
//! Per-thread results are not collected through a thread-local
//! `BinaryHeap` drained after shutdown. Each `ShardCommand` writes its own
//! result into a pre-sized slot it alone owns
//! (`Arc<Vec<OnceLock<PathBuf>>>`, one slot per shard index), so there is
//! no shared mutable state to lock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use anyhow::{anyhow, Context};
use command_executor::command::Command;
use command_executor::shutdown_mode::ShutdownMode;
use command_executor::thread_pool_builder::ThreadPoolBuilder;

use crate::config::Config;
use crate::fd_limit;
use crate::merger;
use crate::partition::{self, Shard};
use crate::run_producer;

struct ShardCommand {
    input: PathBuf,
    shard: Shard,
    thread_id: usize,
    job_root: PathBuf,
    config: Config,
    results: Arc<Vec<OnceLock<PathBuf>>>,
}

impl Command for ShardCommand {
    fn execute(&self) -> Result<(), anyhow::Error> {
        let thread_scratch = self.job_root.join(format!("thread{}", self.thread_id));
        std::fs::create_dir_all(&thread_scratch)
            .with_context(|| format!("creating thread scratch: {}", thread_scratch.display()))?;

        let run_paths = run_producer::produce(
            &self.input,
            self.shard.offset,
            self.shard.len,
            &thread_scratch,
            self.config.memory_budget_bytes(),
            self.config.record_size_bytes(),
        )?;

        let part_path = self.job_root.join(format!("part_{}", self.thread_id));
        merger::merge(&run_paths, &part_path, self.config.record_size_bytes())?;

        // merger::merge removes every run file it consumes, so the thread
        // directory is empty by the time we get here.
        std::fs::remove_dir(&thread_scratch).ok();

        self.results[self.thread_id]
            .set(part_path)
            .map_err(|_| anyhow!("thread {} produced a result twice", self.thread_id))?;
        Ok(())
    }
}

/// Sorts `input` into `output` using `config.worker_count()` threads for
/// both I/O overlap and CPU parallelism. Same input/output contract as
/// [`crate::external_sort::sort`].
///
/// Up to `config.worker_count()` `ShardCommand`s run `merger::merge`
/// concurrently on the thread pool, so `fd_limit` headroom for the whole
/// job is raised once here, before any shard starts, and restored once
/// after the final merge, never per shard, since `RLIMIT_NOFILE` is a
/// process-wide limit that concurrent raises/restores would race on.
pub fn sort(input: &Path, output: &Path, config: &Config) -> Result<(), anyhow::Error> {
    config.validate()?;

    let file_len = input
        .metadata()
        .with_context(|| format!("stat-ing input: {}", input.display()))?
        .len();
    let worker_count = config.worker_count();
    let shards = partition::partition(file_len, worker_count, config.record_size_bytes());
    log::info!(
        "start multi-threaded sort: {} -> {}, {} threads",
        input.display(),
        output.display(),
        shards.len()
    );

    let job_files: u64 = shards
        .iter()
        .map(|shard| run_producer::estimated_run_count(shard.len, config.memory_budget_bytes(), config.record_size_bytes()) as u64)
        .sum::<u64>()
        + shards.len() as u64 // the final merge's per-thread inputs
        + 16;
    let headroom = fd_limit::raise(job_files)?;
    let result = run_shards(input, output, config, shards);
    fd_limit::restore(headroom)?;
    let elapsed = result?;

    log::info!("finish multi-threaded sort in {:.2}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_shards(input: &Path, output: &Path, config: &Config, shards: Vec<Shard>) -> Result<std::time::Duration, anyhow::Error> {
    let start = Instant::now();

    let job_root = tempfile::Builder::new()
        .prefix("record-sort-mt-")
        .tempdir_in(config.tmp_dir())
        .context("creating job scratch directory")?;

    let results: Arc<Vec<OnceLock<PathBuf>>> = Arc::new((0..shards.len()).map(|_| OnceLock::new()).collect());

    let mut pool = ThreadPoolBuilder::new()
        .with_name("external-sort-mt".to_string())
        .with_tasks(shards.len().max(1))
        .with_queue_size(shards.len().max(1))
        .with_shutdown_mode(ShutdownMode::CompletePending)
        .build()
        .map_err(|e| anyhow!("building thread pool: {}", e))?;

    for (thread_id, shard) in shards.into_iter().enumerate() {
        pool.submit(Box::new(ShardCommand {
            input: input.to_path_buf(),
            shard,
            thread_id,
            job_root: job_root.path().to_path_buf(),
            config: config.clone(),
            results: results.clone(),
        }));
    }

    pool.shutdown();
    pool.join().context("joining external-sort-mt thread pool")?;

    let part_paths: Vec<PathBuf> = results
        .iter()
        .enumerate()
        .map(|(i, slot)| slot.get().cloned().ok_or_else(|| anyhow!("thread {} produced no result", i)))
        .collect::<Result<_, _>>()?;

    merger::merge(&part_paths, output, config.record_size_bytes())?;

    Ok(start.elapsed())
}
