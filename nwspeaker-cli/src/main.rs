//! nwspeaker command-line packet crafter

use std::process::ExitCode;

use nwspeaker_cli::Cli;
use nwspeaker_core::ByteOrder;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // RUST_LOG wins over -v
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();

    let byte_order = ByteOrder::probe();
    debug!("Host byte order: {:?}", byte_order);

    match nwspeaker_cli::run(cli.command, byte_order) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_permission_denied() {
                eprintln!("Raw sockets need root or CAP_NET_RAW");
            }
            ExitCode::FAILURE
        }
    }
}
