use std::path::PathBuf;

use anyhow::{anyhow, Error};

use crate::record::DEFAULT_RECORD_SIZE;

/// Number of worker threads for a multi-threaded sort: either sized
/// automatically from `num_cpus::get() + 2` (the "+2" is heuristic overlap
/// for the I/O-bound phases, per the source this crate is drawn from) or
/// pinned to a fixed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerCount {
    Auto,
    Fixed(usize),
}

impl WorkerCount {
    pub(crate) fn resolve(self) -> usize {
        match self {
            WorkerCount::Auto => num_cpus::get() + 2,
            WorkerCount::Fixed(n) => n,
        }
    }
}

/// Shared configuration threaded through every sort phase.
///
/// The default is 100-byte records, a 100MB per-task memory budget, and
/// the system temp directory for scratch files.
#[derive(Clone, Debug)]
pub struct Config {
    tmp_dir: PathBuf,
    record_size_bytes: usize,
    memory_budget_bytes: u64,
    worker_count: WorkerCount,
    net_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            tmp_dir: std::env::temp_dir(),
            record_size_bytes: DEFAULT_RECORD_SIZE,
            memory_budget_bytes: 100_000_000,
            worker_count: WorkerCount::Auto,
            net_buffer_size: 8192,
        }
    }
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Directory for scratch (run/shard) files. Defaults to
    /// `std::env::temp_dir()`. For large jobs prefer a dedicated directory on
    /// the same filesystem as the output.
    pub fn with_tmp_dir(mut self, tmp_dir: PathBuf) -> Config {
        self.tmp_dir = tmp_dir;
        self
    }

    /// Record width in bytes. Default 100.
    pub fn with_record_size_bytes(mut self, record_size_bytes: usize) -> Config {
        self.record_size_bytes = record_size_bytes;
        self
    }

    /// Per-task in-memory budget in bytes. Default 10^8. A multi-threaded
    /// sort's peak memory is approximately `worker_count * memory_budget_bytes`.
    pub fn with_memory_budget_bytes(mut self, memory_budget_bytes: u64) -> Config {
        self.memory_budget_bytes = memory_budget_bytes;
        self
    }

    /// Worker/thread count for a multi-threaded sort. Default `Auto`.
    pub fn with_worker_count(mut self, worker_count: WorkerCount) -> Config {
        self.worker_count = worker_count;
        self
    }

    /// TCP send/recv buffer size shared by the coordinator and the worker.
    /// Default 8192.
    pub fn with_net_buffer_size(mut self, net_buffer_size: usize) -> Config {
        self.net_buffer_size = net_buffer_size;
        self
    }

    pub fn tmp_dir(&self) -> &PathBuf {
        &self.tmp_dir
    }

    pub fn record_size_bytes(&self) -> usize {
        self.record_size_bytes
    }

    pub fn memory_budget_bytes(&self) -> u64 {
        self.memory_budget_bytes
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count.resolve()
    }

    pub fn net_buffer_size(&self) -> usize {
        self.net_buffer_size
    }

    /// A memory budget smaller than one record can never hold a single
    /// record to sort; this is a configuration error, not something to
    /// silently clamp.
    pub fn validate(&self) -> Result<(), Error> {
        if self.record_size_bytes == 0 {
            return Err(anyhow!("record size must be greater than zero"));
        }
        if self.memory_budget_bytes < self.record_size_bytes as u64 {
            return Err(anyhow!(
                "memory budget ({} bytes) is smaller than one record ({} bytes)",
                self.memory_budget_bytes,
                self.record_size_bytes
            ));
        }
        Ok(())
    }
}
