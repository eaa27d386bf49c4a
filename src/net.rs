//! Shared TCP byte-pump: an unframed stream terminated by the sender
//! closing its write half. Both directions, coordinator and worker alike,
//! use the same buffer size and the same read/write loop, so it is
//! written once here instead of once per caller.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::path::Path;

use anyhow::Context;

/// Reads from `stream` until a zero-length read (the peer closed its write
/// half) and writes every byte received to `path`.
pub(crate) fn pump_stream_to_file(stream: &mut TcpStream, path: &Path, buffer_size: usize) -> Result<(), anyhow::Error> {
    let mut file = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    let mut buf = vec![0u8; buffer_size];
    loop {
        let n = stream.read(&mut buf).context("reading from socket")?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).context("writing received bytes to file")?;
    }
    file.flush()?;
    Ok(())
}

/// Streams `path`'s bytes to `stream`, then closes the write half to signal
/// end of stream to the peer, no length prefix or framing.
pub(crate) fn pump_file_to_stream(path: &Path, stream: &mut TcpStream, buffer_size: usize) -> Result<(), anyhow::Error> {
    let mut file = BufReader::new(File::open(path).with_context(|| format!("opening {}", path.display()))?);
    let mut buf = vec![0u8; buffer_size];
    loop {
        let n = file.read(&mut buf).context("reading from file")?;
        if n == 0 {
            break;
        }
        stream.write_all(&buf[..n]).context("writing to socket")?;
    }
    stream.flush().context("flushing socket")?;
    stream.shutdown(Shutdown::Write).context("shutting down write half")?;
    Ok(())
}

/// Streams `[offset, offset+len)` of `path` to `stream`, then closes the
/// write half. Used by the coordinator to send one shard straight out of
/// the input file without materializing it separately.
pub(crate) fn pump_file_range_to_stream(
    path: &Path,
    offset: u64,
    len: u64,
    stream: &mut TcpStream,
    buffer_size: usize,
) -> Result<(), anyhow::Error> {
    use std::io::{Seek, SeekFrom};

    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    file.seek(SeekFrom::Start(offset)).context("seeking to shard start")?;

    let mut buf = vec![0u8; buffer_size];
    let mut remaining = len;
    while remaining > 0 {
        let want = buf.len().min(remaining as usize);
        let n = file.read(&mut buf[..want]).context("reading shard bytes")?;
        if n == 0 {
            break;
        }
        stream.write_all(&buf[..n]).context("writing shard to socket")?;
        remaining -= n as u64;
    }
    stream.flush().context("flushing socket")?;
    stream.shutdown(Shutdown::Write).context("shutting down write half")?;
    Ok(())
}
