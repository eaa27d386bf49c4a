//! Worker node: `connect -> receive shard -> sort -> connect -> send sorted
//! shard`, then exit. The multi-threaded external sort it runs on its
//! shard is [`crate::external_sort_mt`].

use std::net::TcpStream;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;

use crate::config::Config;
use crate::external_sort_mt;
use crate::net;

/// Runs one job against the coordinator at `server:port`: receive a shard,
/// sort it with [`external_sort_mt::sort`], send the sorted shard back.
/// Returns once the second session's last byte has been written.
pub fn run(server: &str, port: u16, config: &Config) -> Result<(), anyhow::Error> {
    config.validate()?;
    let start = Instant::now();

    let input_path = unique_path(config, "slave-input");
    log::info!("connecting to {}:{}", server, port);
    {
        let mut stream = TcpStream::connect((server, port))
            .with_context(|| format!("connecting to {}:{}", server, port))?;
        log::info!("connected, receiving shard");
        net::pump_stream_to_file(&mut stream, &input_path, config.net_buffer_size())?;
    }
    log::info!("received shard, sorting");

    let output_path = unique_path(config, "slave-sorted");
    external_sort_mt::sort(&input_path, &output_path, config)?;
    std::fs::remove_file(&input_path).with_context(|| format!("removing {}", input_path.display()))?;

    log::info!("reconnecting to {}:{} to send sorted shard", server, port);
    let mut stream = TcpStream::connect((server, port))
        .with_context(|| format!("reconnecting to {}:{}", server, port))?;
    net::pump_file_to_stream(&output_path, &mut stream, config.net_buffer_size())?;
    std::fs::remove_file(&output_path).with_context(|| format!("removing {}", output_path.display()))?;

    log::info!("finished worker job in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn unique_path(config: &Config, prefix: &str) -> PathBuf {
    let name = data_encoding::HEXLOWER.encode(&rand::random::<[u8; 16]>());
    config.tmp_dir().join(format!("{}-{}", prefix, name))
}
