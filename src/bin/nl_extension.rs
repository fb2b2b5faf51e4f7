//! Extension process.
//!
//! Reads the startup payload from stdin, connects to the host, answers
//! `eventToExtension` messages, and exits once the host disconnects.
//!
//! Exit codes: `0` when the connection closes, `2` for a bad startup
//! payload, `1` for any other setup failure.

use std::io::{self, Read};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::error;

use nl_extension::logging::init_logging;
use nl_extension::{
    ClientOptions, ConnectionParameters, DEFAULT_HOST, Error, ExtensionClient, LogPolicy, Result,
};

/// Exit code for a missing or malformed startup payload.
const EXIT_BAD_PAYLOAD: u8 = 2;

/// Exit code for any other setup failure.
const EXIT_FAILURE: u8 = 1;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Extension process for a Neutralino-style host")]
struct Args {
    /// Host name of the application.
    #[arg(long, env = "NL_EXTENSION_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// How much protocol traffic to log.
    #[arg(long, value_enum, default_value_t = LogPolicy::Standard)]
    log_policy: LogPolicy,

    /// Handshake timeout in seconds (0 waits forever).
    #[arg(long, default_value_t = 30)]
    connect_timeout_secs: u64,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn client_options(&self) -> ClientOptions {
        let connect_timeout = (self.connect_timeout_secs > 0)
            .then(|| Duration::from_secs(self.connect_timeout_secs));
        ClientOptions::new()
            .host(self.host.clone())
            .log_policy(self.log_policy)
            .connect_timeout(connect_timeout)
    }
}

/// Runs the extension until the host connection closes.
async fn run(args: &Args, input: impl Read) -> Result<()> {
    let params = ConnectionParameters::from_reader(input)?;
    params.log_diagnostics();

    let client = ExtensionClient::connect(params, args.client_options())?;

    // The host going away is the only way out
    client.closed().await;
    Ok(())
}

/// Maps a setup failure to the process exit code.
fn exit_code(err: &Error) -> u8 {
    if err.is_startup_error() {
        EXIT_BAD_PAYLOAD
    } else {
        EXIT_FAILURE
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args, io::stdin().lock()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Cannot run extension");
            ExitCode::from(exit_code(&e))
        }
    }
}
