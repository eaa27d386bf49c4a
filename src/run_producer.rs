//! Run producer: reads a shard in memory-budget-sized chunks, sorts each
//! chunk in memory, and writes it out as one sorted run file. Generalized
//! to an arbitrary `(offset, len)` shard of the input so the single- and
//! multi-threaded callers share this one implementation.
//!
//! Records are sorted by their offsets into one read buffer rather than
//! materialized as a `Box<[u8]>` per record. A record is only boxed once
//! it crosses into the heap or a run file, which happens downstream in
//! `merger.rs`.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::chunk_iterator::ChunkIterator;
use crate::record;

/// Reads exactly `len` bytes of `input` starting at `offset` (a shard, or
/// the whole file when `offset == 0` and `len` is the file size), producing
/// one sorted run file per `memory_budget_bytes`-sized chunk under
/// `scratch_dir`, named `part_<i>` for `i` in run order. A short final read
/// (fewer than `record_size` bytes) is discarded, the partial final record
/// policy. Chunk boundaries are computed once by [`ChunkIterator`] rather
/// than re-derived here.
pub(crate) fn produce(
    input: &Path,
    offset: u64,
    len: u64,
    scratch_dir: &Path,
    memory_budget_bytes: u64,
    record_size: usize,
) -> Result<Vec<PathBuf>, anyhow::Error> {
    let mut file = File::open(input).with_context(|| format!("opening input: {}", input.display()))?;
    file.seek(SeekFrom::Start(offset))
        .with_context(|| format!("seeking to {} in {}", offset, input.display()))?;

    let records_per_chunk = ((memory_budget_bytes as usize) / record_size).max(1);
    let chunk_bytes = records_per_chunk * record_size;
    let mut buffer = vec![0u8; chunk_bytes];

    let chunks = ChunkIterator::new(input, offset, len, chunk_bytes as u64, record_size as u64)?;
    let mut run_paths = Vec::new();
    let mut run_index = 0usize;

    for chunk in chunks {
        let want = chunk.length() as usize;
        let target = &mut buffer[..want];

        let mut filled = 0usize;
        while filled < want {
            let n = file.read(&mut target[filled..]).context("reading input chunk")?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            break;
        }

        let usable = filled - (filled % record_size);
        if usable > 0 {
            let n_records = usable / record_size;
            let mut offsets: Vec<usize> = (0..n_records).map(|i| i * record_size).collect();
            offsets.sort_unstable_by(|&a, &b| record::compare(&target[a..a + record_size], &target[b..b + record_size]));

            let run_path = scratch_dir.join(format!("part_{}", run_index));
            let mut writer = BufWriter::new(
                File::create(&run_path).with_context(|| format!("creating run file: {}", run_path.display()))?,
            );
            for off in offsets {
                writer.write_all(&target[off..off + record_size])?;
            }
            writer.flush()?;
            run_paths.push(run_path);
            run_index += 1;
        }

        if filled < want {
            break;
        }
    }

    Ok(run_paths)
}

/// Upper bound on the number of run files a [`produce`] call over `len`
/// bytes of a shard can create, given the same `memory_budget_bytes` and
/// `record_size` it would be called with. Used by callers to size
/// `fd_limit` headroom before any runs actually exist.
pub(crate) fn estimated_run_count(len: u64, memory_budget_bytes: u64, record_size: usize) -> usize {
    let records_per_chunk = ((memory_budget_bytes as usize) / record_size).max(1);
    let chunk_bytes = (records_per_chunk * record_size) as u64;
    let n_records = len / record_size as u64;
    if n_records == 0 {
        0
    } else {
        ((len + chunk_bytes - 1) / chunk_bytes) as usize
    }
}
