//! K-way merger: given N sorted run files, streams a globally sorted
//! output by maintaining a min-heap of one record per run. The single-
//! threaded sort, the multi-threaded sort's per-thread merge, and the
//! coordinator's final merge are all the same loop over that heap, so it
//! is written once here and shared by every caller. Records are held
//! inline in the heap (a fixed-size buffer plus a run index) rather than
//! behind a pointer, avoiding a per-record allocation on the merge's hot
//! path.

use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::heap_cursor::HeapCursor;

/// Sequential reader over one run file, handing out exactly-`record_size`
/// records.
struct RunReader {
    reader: BufReader<File>,
    record_size: usize,
}

impl RunReader {
    fn open(path: &Path, record_size: usize) -> Result<RunReader, anyhow::Error> {
        let file = File::open(path).with_context(|| format!("opening run: {}", path.display()))?;
        Ok(RunReader { reader: BufReader::new(file), record_size })
    }

    /// Reads the next record, or `None` at end of run. A partial read
    /// (fewer than `record_size` bytes, more than zero) is treated as end
    /// of run rather than an error; this is the defensive policy, not the
    /// strict one.
    fn next_record(&mut self) -> Result<Option<Box<[u8]>>, anyhow::Error> {
        let mut buf = vec![0u8; self.record_size];
        let mut filled = 0usize;
        while filled < self.record_size {
            let n = self.reader.read(&mut buf[filled..]).context("reading run record")?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled < self.record_size {
            return Ok(None);
        }
        Ok(Some(buf.into_boxed_slice()))
    }
}

/// Merges `run_paths` into one sorted `output_path`, deleting each run file
/// as soon as it is exhausted. Zero runs produce an empty output; one run
/// produces a byte-identical copy.
///
/// Opens one file descriptor per entry in `run_paths` plus the output file;
/// callers that may run this concurrently with other merges, or that know
/// the job's total open-file count up front, are responsible for raising
/// `fd_limit` headroom around the whole job themselves, since `RLIMIT_NOFILE`
/// is a process-wide limit and this function must not raise or restore it
/// on its own behalf.
pub(crate) fn merge(run_paths: &[PathBuf], output_path: &Path, record_size: usize) -> Result<(), anyhow::Error> {
    log::info!("merging {} runs into {}", run_paths.len(), output_path.display());

    let mut output = BufWriter::new(
        File::create(output_path).with_context(|| format!("creating output: {}", output_path.display()))?,
    );

    let mut readers: Vec<Option<RunReader>> = Vec::with_capacity(run_paths.len());
    for path in run_paths {
        readers.push(Some(RunReader::open(path, record_size)?));
    }

    let mut heap: BinaryHeap<HeapCursor> = BinaryHeap::with_capacity(readers.len());
    for (i, slot) in readers.iter_mut().enumerate() {
        let reader = slot.as_mut().expect("freshly opened reader");
        match reader.next_record()? {
            Some(record) => heap.push(HeapCursor { run_index: i, record }),
            None => {
                *slot = None;
                std::fs::remove_file(&run_paths[i]).with_context(|| format!("removing empty run: {}", run_paths[i].display()))?;
            }
        }
    }

    while let Some(cursor) = heap.pop() {
        output.write_all(&cursor.record)?;
        let i = cursor.run_index;
        let reader = readers[i].as_mut().expect("cursor's run still open");
        match reader.next_record()? {
            Some(record) => heap.push(HeapCursor { run_index: i, record }),
            None => {
                readers[i] = None;
                std::fs::remove_file(&run_paths[i]).with_context(|| format!("removing exhausted run: {}", run_paths[i].display()))?;
            }
        }
    }

    output.flush()?;
    log::info!("finished merging into {}", output_path.display());
    Ok(())
}
