//! Record-aligned partition arithmetic shared by the multi-threaded
//! external sort and the coordinator: both split the same way, so it is
//! written once here instead of twice.

/// A `(offset, len)` byte range, always a whole number of records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Shard {
    pub(crate) offset: u64,
    pub(crate) len: u64,
}

/// Splits `total_len` bytes of `record_size`-byte records into `parts`
/// shards as evenly as possible: `q = n_rec / parts`, `rem = n_rec % parts`,
/// the first `rem` shards getting one extra record. Concatenating the
/// shards in order reproduces `total_len` bytes exactly; a trailing partial
/// record beyond the last whole record is excluded.
pub(crate) fn partition(total_len: u64, parts: usize, record_size: usize) -> Vec<Shard> {
    let record_size = record_size as u64;
    let n_rec = total_len / record_size;
    let parts = parts.max(1) as u64;
    let q = n_rec / parts;
    let rem = n_rec % parts;

    let mut shards = Vec::with_capacity(parts as usize);
    let mut offset = 0u64;
    for i in 0..parts {
        let count = q + u64::from(i < rem);
        let len = count * record_size;
        shards.push(Shard { offset, len });
        offset += len;
    }
    shards
}
