use std::process::ExitCode;

use clap::Parser;
use sshdeck::{cli::Args, App};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SSHDECK_LOG";

fn main() -> ExitCode {
    init_logging();

    let app = App::new(Args::parse());
    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

// Logs go to stderr and stay at `warn` unless asked, so the menu is not
// interleaved with chatter.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
