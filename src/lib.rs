//! Core library entry for the `ngcontract` CLI.
//!
//! A *component contract* is a normalized JSON snapshot of one Angular-style
//! component: its public API, content slots, a flat DOM table built from the
//! template and the stylesheet rules matched against that DOM. Contracts are
//! built by [`contract::builder::ContractBuilder`], persisted by
//! [`store::ContractStore`] and compared by the [`diff`] engine.

pub mod adapters;
pub mod cache;
pub mod cli;
pub mod collect;
pub mod commands;
pub mod config;
pub mod context;
pub mod contract;
pub mod diff;
pub mod dom_path;
pub mod error;
pub mod parse;
pub mod ports;
pub mod store;

use std::path::Path;

use clap::Parser;

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::config::Settings;

/// Run the CLI with the provided arguments, resolving settings from the
/// environment and the working directory.
///
/// # Errors
///
/// Returns an error string when settings cannot be resolved, argument
/// parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let settings = Settings::from_env(&LiveFileSystem, Path::new(".")).map_err(|e| e.to_string())?;
    run_with_settings(args, &settings)
}

/// Run the CLI with the provided arguments and pre-resolved settings.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run_with_settings<I, T>(args: I, settings: &Settings) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli.command, settings)
}
