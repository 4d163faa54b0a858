//! Command-line interface for whoshome.
//!
//! This module provides the CLI structure and the interactive session driven
//! by the `whoshome` binary.

mod commands;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{AddCommand, BackendArg, ConfigCommand, ListCommand, MemberCommand};

use crate::logging::Verbosity;

/// whoshome - See who is at home
///
/// Keeps a shared roster of household members and whether each one is home
/// or away, stored in a hosted table or a local database.
#[derive(Debug, Parser)]
#[command(name = "whoshome")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Override the configured store backend
    #[arg(long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show who is home
    List(ListCommand),

    /// Add a household member
    Add(AddCommand),

    /// Flip a member between home and away
    Toggle(MemberCommand),

    /// Remove a household member
    Delete(MemberCommand),

    /// Show the colour palette
    Colors,

    /// Start an interactive session
    Session,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}
