//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::Backend;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output members and counts as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Display name of the new member
    pub name: String,

    /// Role in the household (e.g., Parent, Child, Grandparent)
    pub role: String,

    /// Palette colour, by name or token (see `whoshome colors`)
    #[arg(long, default_value = "pink")]
    pub color: String,
}

/// Arguments for commands acting on one member.
#[derive(Debug, Args)]
pub struct MemberCommand {
    /// Member id, unique id prefix, or list position as `#N`
    pub selector: String,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (secrets masked)
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Store backend argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Hosted PostgREST/Supabase table
    Rest,
    /// Local SQLite database
    Sqlite,
    /// In-process table, discarded on exit
    Memory,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Rest => Self::Rest,
            BackendArg::Sqlite => Self::Sqlite,
            BackendArg::Memory => Self::Memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_arg_conversion() {
        assert_eq!(Backend::from(BackendArg::Rest), Backend::Rest);
        assert_eq!(Backend::from(BackendArg::Sqlite), Backend::Sqlite);
        assert_eq!(Backend::from(BackendArg::Memory), Backend::Memory);
    }

    #[test]
    fn test_add_command_debug() {
        let cmd = AddCommand {
            name: "Alice".to_string(),
            role: "Parent".to_string(),
            color: "blue".to_string(),
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Alice"));
        assert!(debug_str.contains("blue"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
