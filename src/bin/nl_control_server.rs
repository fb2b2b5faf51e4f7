//! Control server process.
//!
//! Serves `GET /ping` and `POST /shutdown` on loopback and exits with
//! code `0` after a shutdown request.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use nl_extension::logging::init_logging;
use nl_extension::{ControlServer, DEFAULT_CONTROL_PORT};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Loopback liveness and shutdown server")]
struct Args {
    /// Port to listen on (loopback only).
    #[arg(long, default_value_t = DEFAULT_CONTROL_PORT)]
    port: u16,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    let server = match ControlServer::bind(args.port).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, port = args.port, "Cannot bind control server");
            return ExitCode::FAILURE;
        }
    };

    match server.serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Control server failed");
            ExitCode::FAILURE
        }
    }
}
