//! Entry point: parses the four-mode CLI surface, initializes logging,
//! and dispatches into the library. Everything past `main` calls into
//! `record_file_sort`.

mod cli;

use clap::Parser;
use simple_logger::SimpleLogger;

use cli::{Cli, Mode};
use record_file_sort::{coordinator, external_sort, external_sort_mt, worker};

fn main() {
    SimpleLogger::new().init().expect("failed to initialize logger");

    let cli = Cli::parse();
    if let Err(e) = cli.validate() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let config = cli.to_config();
    let result = match cli.mode {
        Mode::Sort => external_sort::sort(
            cli.input.as_ref().expect("validated"),
            cli.output.as_ref().expect("validated"),
            &config,
        ),
        Mode::SortMt => external_sort_mt::sort(
            cli.input.as_ref().expect("validated"),
            cli.output.as_ref().expect("validated"),
            &config,
        ),
        Mode::Master => coordinator::run(
            cli.port.expect("validated"),
            cli.num.expect("validated"),
            cli.input.as_ref().expect("validated"),
            cli.output.as_ref().expect("validated"),
            &config,
        ),
        Mode::Slave => worker::run(
            cli.server.as_deref().unwrap_or("127.0.0.1"),
            cli.port.expect("validated"),
            &config,
        ),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
