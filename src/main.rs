//! Binary entrypoint for the `ngcontract` CLI.

use std::path::Path;
use std::process::ExitCode;

use ngcontract::adapters::live::filesystem::LiveFileSystem;
use ngcontract::config::{Settings, DEFAULT_LOG_FILTER};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // A missing .env file is the common case.
    let _ = dotenvy::dotenv();

    let settings = match Settings::from_env(&LiveFileSystem, Path::new(".")) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&settings.log_filter);

    match ngcontract::run_with_settings(std::env::args(), &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
