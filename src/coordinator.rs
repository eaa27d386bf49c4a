//! Coordinator / master: accepts `slave_num` worker connections, streams
//! one record-aligned shard to each, accepts `slave_num` new connections
//! for the sorted results, then k-way merges them into the output.
//!
//! Both accept rounds run sequentially on this function's own thread,
//! before any worker thread for that round is spawned, so the i-th
//! connection accepted in a round is, by construction, index i: no
//! `accept()` ever races another `accept()` for the index assignment.
//! Each round's results are collected by joining scoped threads and
//! reading their return values, so there is no shared mutable vector to
//! lock in the first place.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context};
use socket2::{Domain, Protocol, Socket, Type};

use crate::config::Config;
use crate::fd_limit;
use crate::merger;
use crate::net;
use crate::partition;

/// Runs one coordinator job: partition `input` into `slave_num` shards, one
/// per worker that connects on `port`, and merge their sorted results into
/// `output`.
pub fn run(port: u16, slave_num: usize, input: &std::path::Path, output: &std::path::Path, config: &Config) -> Result<(), anyhow::Error> {
    config.validate()?;
    if slave_num == 0 {
        return Err(anyhow!("slave count must be at least 1"));
    }
    let start = Instant::now();

    let listener = bind_listener(port, slave_num)?;
    log::info!("listening on 0.0.0.0:{}, waiting for {} workers", port, slave_num);

    let client_streams = accept_round(&listener, slave_num)?;

    let file_len = input
        .metadata()
        .with_context(|| format!("stat-ing input: {}", input.display()))?
        .len();
    let shards = partition::partition(file_len, slave_num, config.record_size_bytes());

    send_shards(input, &shards, client_streams, config.net_buffer_size())?;
    std::fs::remove_file(input).with_context(|| format!("removing input: {}", input.display()))?;

    let client_streams = accept_round(&listener, slave_num)?;

    let job_root = tempfile::Builder::new()
        .prefix("record-coordinator-")
        .tempdir_in(config.tmp_dir())
        .context("creating coordinator scratch directory")?;
    let part_paths = receive_shards(client_streams, job_root.path(), config.net_buffer_size())?;

    let headroom = fd_limit::raise((part_paths.len() + 16) as u64)?;
    let merge_result = merger::merge(&part_paths, output, config.record_size_bytes());
    fd_limit::restore(headroom)?;
    merge_result?;

    log::info!("finished coordinator job in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn bind_listener(port: u16, backlog: usize) -> Result<TcpListener, anyhow::Error> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).context("creating listening socket")?;
    socket.set_reuse_address(true).context("setting SO_REUSEADDR")?;
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse().expect("valid socket address");
    socket.bind(&addr.into()).with_context(|| format!("binding to port {}", port))?;
    socket.listen(backlog as i32).context("listening")?;
    Ok(socket.into())
}

/// Accepts exactly `n` connections on `listener`, sequentially, so the i-th
/// returned stream is the i-th connection accepted.
fn accept_round(listener: &TcpListener, n: usize) -> Result<Vec<TcpStream>, anyhow::Error> {
    let mut streams = Vec::with_capacity(n);
    for i in 0..n {
        let (stream, peer) = listener.accept().with_context(|| format!("accepting connection {}", i))?;
        log::info!("accepted connection {} from {}", i, peer);
        streams.push(stream);
    }
    Ok(streams)
}

fn send_shards(
    input: &std::path::Path,
    shards: &[partition::Shard],
    client_streams: Vec<TcpStream>,
    buffer_size: usize,
) -> Result<(), anyhow::Error> {
    std::thread::scope(|scope| -> Result<(), anyhow::Error> {
        let mut handles = Vec::with_capacity(shards.len());
        for (i, (shard, mut stream)) in shards.iter().copied().zip(client_streams).enumerate() {
            handles.push(scope.spawn(move || -> Result<(), anyhow::Error> {
                log::info!("sending shard {} ({} bytes) to worker {}", i, shard.len, i);
                net::pump_file_range_to_stream(input, shard.offset, shard.len, &mut stream, buffer_size)
            }));
        }
        for handle in handles {
            handle.join().map_err(|_| anyhow!("send thread panicked"))??;
        }
        Ok(())
    })
}

fn receive_shards(client_streams: Vec<TcpStream>, job_root: &std::path::Path, buffer_size: usize) -> Result<Vec<PathBuf>, anyhow::Error> {
    std::thread::scope(|scope| -> Result<Vec<PathBuf>, anyhow::Error> {
        let mut handles = Vec::with_capacity(client_streams.len());
        for (i, mut stream) in client_streams.into_iter().enumerate() {
            let part_path = job_root.join(format!("slave{}.part", i));
            handles.push(scope.spawn(move || -> Result<PathBuf, anyhow::Error> {
                log::info!("receiving sorted shard from worker {}", i);
                net::pump_stream_to_file(&mut stream, &part_path, buffer_size)?;
                Ok(part_path)
            }));
        }
        handles
            .into_iter()
            .map(|h| h.join().map_err(|_| anyhow!("recv thread panicked"))?)
            .collect()
    })
}
