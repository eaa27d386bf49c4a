use std::path::PathBuf;
use data_encoding::HEXLOWER;

pub const RECORD_SIZE: usize = 100;

/// One record filled with `byte`, `RECORD_SIZE` bytes wide.
#[allow(dead_code)]
pub fn record(byte: u8) -> Vec<u8> {
    vec![byte; RECORD_SIZE]
}

/// `n` identical records, each filled with `byte`.
#[allow(dead_code)]
pub fn identical_records(byte: u8, n: usize) -> Vec<u8> {
    vec![byte; RECORD_SIZE * n]
}

/// `n` records holding the big-endian encoding of `0..n`, each left-padded
/// with zero bytes to `RECORD_SIZE`, in ascending order.
#[allow(dead_code)]
pub fn ascending_records(n: u32) -> Vec<u8> {
    (0..n)
        .flat_map(|i| {
            let mut record = vec![0u8; RECORD_SIZE];
            record[RECORD_SIZE - 4..].copy_from_slice(&i.to_be_bytes());
            record
        })
        .collect()
}

/// Same records as [`ascending_records`], concatenated in reverse order.
#[allow(dead_code)]
pub fn descending_records(n: u32) -> Vec<u8> {
    (0..n)
        .rev()
        .flat_map(|i| {
            let mut record = vec![0u8; RECORD_SIZE];
            record[RECORD_SIZE - 4..].copy_from_slice(&i.to_be_bytes());
            record
        })
        .collect()
}

/// `n` pseudo-random records seeded deterministically from `seed`, so two
/// calls with the same arguments produce byte-identical output.
#[allow(dead_code)]
pub fn seeded_random_records(seed: u64, n: usize) -> Vec<u8> {
    // xorshift64 - deterministic, dependency-free, good enough to scatter
    // record contents for a sort test.
    let mut state = seed.max(1);
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let mut data = Vec::with_capacity(n * RECORD_SIZE);
    for _ in 0..n {
        for _ in 0..(RECORD_SIZE / 8) {
            data.extend_from_slice(&next().to_be_bytes());
        }
    }
    data
}

/// Splits a flat byte buffer into a `Vec` of `RECORD_SIZE`-wide records.
#[allow(dead_code)]
pub fn into_records(bytes: &[u8]) -> Vec<&[u8]> {
    bytes.chunks(RECORD_SIZE).collect()
}

#[allow(dead_code)]
pub fn temp_file_name(dir: &std::path::Path) -> PathBuf {
    let name = HEXLOWER.encode(&rand::random::<[u8; 16]>());
    dir.join(name)
}
