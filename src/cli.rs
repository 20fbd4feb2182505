//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `ngcontract`.
#[derive(Debug, Parser)]
#[command(name = "ngcontract", version, about = "Build and diff structural component contracts")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a contract from a component class and save it to the store.
    Build {
        /// Component class file (`*.component.ts`).
        #[arg(long = "ts", value_name = "FILE")]
        typescript: PathBuf,
        /// Template file, overriding the decorator's `templateUrl`.
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
        /// Stylesheet, overriding the decorator's `styleUrl(s)`.
        #[arg(long, value_name = "FILE")]
        styles: Option<PathBuf>,
        /// Also print the contract JSON to stdout.
        #[arg(long)]
        print: bool,
    },
    /// Diff two saved contracts and print the report as JSON.
    Diff {
        /// Earlier contract file.
        before: PathBuf,
        /// Later contract file.
        after: PathBuf,
        /// Replace repeated DOM paths with dictionary references.
        #[arg(long)]
        dedup: bool,
    },
    /// List saved contracts, newest first.
    List {
        /// Only contracts whose component name contains this text.
        #[arg(long)]
        component: Option<String>,
        /// Maximum number of entries to print.
        #[arg(long)]
        limit: Option<usize>,
    },
}
