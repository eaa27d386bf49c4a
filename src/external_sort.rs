//! Single-threaded external sort: composes the run producer and the
//! k-way merger, bracketed by the scratch directory and the `rlimit`
//! headroom the merge needs.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::config::Config;
use crate::fd_limit;
use crate::run_producer;

/// Sorts `input` into `output`, using at most `config.memory_budget_bytes()`
/// at a time. Scratch run files live under a job-private directory inside
/// `config.tmp_dir()` and are gone before this function returns
/// successfully.
pub fn sort(input: &Path, output: &Path, config: &Config) -> Result<(), anyhow::Error> {
    config.validate()?;
    let start = Instant::now();
    log::info!("start sort: {} -> {}", input.display(), output.display());

    let scratch = tempfile::Builder::new()
        .prefix("record-sort-")
        .tempdir_in(config.tmp_dir())
        .context("creating scratch directory")?;

    let file_len = input
        .metadata()
        .with_context(|| format!("stat-ing input: {}", input.display()))?
        .len();
    let aligned_len = file_len - (file_len % config.record_size_bytes() as u64);

    let run_paths = run_producer::produce(
        input,
        0,
        aligned_len,
        scratch.path(),
        config.memory_budget_bytes(),
        config.record_size_bytes(),
    )?;

    let headroom = fd_limit::raise((run_paths.len() + 16) as u64)?;
    let merge_result = crate::merger::merge(&run_paths, output, config.record_size_bytes());
    fd_limit::restore(headroom)?;
    merge_result?;

    log::info!("finish sort in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
