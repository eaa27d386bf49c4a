//! Command-line surface: four modes, `sort`, `sort_mt`, `master`, `slave`,
//! sharing one flat flag set. `clap` derive is used instead of
//! subcommands because the modes share almost all their flags and
//! `--mode` is just another value, not a branch in the grammar.

use std::path::PathBuf;

use anyhow::{anyhow, Error};
use clap::{Parser, ValueEnum};

use record_file_sort::config::{Config, WorkerCount};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Single-threaded local external sort.
    Sort,
    /// Multi-threaded local external sort.
    #[value(name = "sort_mt")]
    SortMt,
    /// Coordinator: fan the input out to workers and merge their results.
    Master,
    /// Worker: connect to a coordinator, sort a shard, send it back.
    Slave,
}

/// `./record-sort -m master -p 8080 -n 5 -i ./input -o ./output`
/// `./record-sort -m slave -s 127.0.0.1 -p 8080`
/// `./record-sort -m sort -i ./input -o ./output`
/// `./record-sort -m sort_mt -i ./input -o ./output`
#[derive(Parser, Debug)]
#[command(author, version, about = "External-memory sort for fixed-width binary record files", long_about = None)]
pub struct Cli {
    /// Mode to run: sort, sort_mt, master, slave.
    #[arg(short, long, value_enum)]
    pub mode: Mode,

    /// TCP port. Required for master and slave.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Number of workers the master waits for. Required for master.
    #[arg(short, long)]
    pub num: Option<usize>,

    /// Input file path. Required for sort, sort_mt, master.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file path. Required for sort, sort_mt, master.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Coordinator address. Required for slave.
    #[arg(short, long)]
    pub server: Option<String>,

    /// Per-task in-memory budget in bytes. Defaults to 10^8.
    #[arg(long)]
    pub memory_budget_bytes: Option<u64>,

    /// Record width in bytes. Defaults to 100.
    #[arg(long)]
    pub record_size_bytes: Option<usize>,

    /// Scratch directory for run/shard files. Defaults to the system temp dir.
    #[arg(long)]
    pub tmp_dir: Option<PathBuf>,

    /// Thread count for sort_mt (and for a worker's own internal
    /// multi-threaded sort). Distinct from --num, the master's slave count.
    /// Defaults to hardware_concurrency + 2.
    #[arg(long)]
    pub workers: Option<usize>,
}

impl Cli {
    /// Validates that the flags required by `self.mode` are present. A
    /// missing flag is a configuration error: print usage via the returned
    /// error and exit 1, never panic.
    pub fn validate(&self) -> Result<(), Error> {
        match self.mode {
            Mode::Sort | Mode::SortMt => {
                if self.input.is_none() || self.output.is_none() {
                    return Err(anyhow!("mode {:?} requires --input and --output", self.mode));
                }
            }
            Mode::Master => {
                if self.num.is_none() || self.input.is_none() || self.output.is_none() {
                    return Err(anyhow!("mode master requires --num, --input and --output"));
                }
                if self.port.is_none() {
                    return Err(anyhow!("mode master requires --port"));
                }
            }
            Mode::Slave => {
                if self.port.is_none() {
                    return Err(anyhow!("mode slave requires --port"));
                }
            }
        }
        Ok(())
    }

    /// Builds a [`Config`] from whichever of `--memory-budget-bytes`,
    /// `--record-size-bytes`, `--tmp-dir` and `--workers` were given,
    /// layered over [`Config::new`]'s defaults.
    pub fn to_config(&self) -> Config {
        let mut config = Config::new();
        if let Some(memory_budget_bytes) = self.memory_budget_bytes {
            config = config.with_memory_budget_bytes(memory_budget_bytes);
        }
        if let Some(record_size_bytes) = self.record_size_bytes {
            config = config.with_record_size_bytes(record_size_bytes);
        }
        if let Some(tmp_dir) = self.tmp_dir.clone() {
            config = config.with_tmp_dir(tmp_dir);
        }
        if let Some(workers) = self.workers {
            config = config.with_worker_count(WorkerCount::Fixed(workers));
        }
        config
    }
}
