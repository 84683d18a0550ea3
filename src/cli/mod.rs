//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::constants::{ENVIRONMENT_VAR, PROJECT_VAR, STORE_VAR};
use crate::core::convert::Cast;
use crate::core::parameter::ParameterKind;

pub use commands::execute;

/// Backstop - typed, cached parameter resolution for project/environment scopes.
#[derive(Parser)]
#[command(
    name = "backstop",
    about = "Typed, cached resolution layer over a hierarchical parameter store",
    version
)]
pub struct Cli {
    /// Show debugging info
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project name (default: .backstop.toml)
    #[arg(short, long, global = true, env = PROJECT_VAR)]
    pub project: Option<String>,

    /// Environment name ("All" is the global wildcard)
    #[arg(short, long, global = true, env = ENVIRONMENT_VAR)]
    pub environment: Option<String>,

    /// Store document path
    #[arg(long, global = true, env = STORE_VAR)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// List all or selected parameters
    Show {
        /// Keys to show (all when omitted)
        keys: Vec<String>,
        /// Decrypt secret parameters on listing
        #[arg(short = 'x', long)]
        decrypt: bool,
    },

    /// Resolve one parameter and print its value
    Get {
        /// Key, partial path or fullpath
        key: String,
        /// Conversion applied to the raw value
        #[arg(short = 't', long = "type", value_enum, default_value_t)]
        cast: Cast,
        /// Leave secret values sealed
        #[arg(long)]
        no_decrypt: bool,
        /// Prefix the output with the resolved fullpath
        #[arg(long)]
        path: bool,
        /// Value to print when no candidate resolves
        #[arg(long)]
        default: Option<String>,
    },

    /// Add or modify a parameter
    Set {
        /// Parameter kind
        #[arg(short = 't', long = "type", default_value = "String")]
        kind: ParameterKind,
        key: String,
        value: String,
    },

    /// Delete a parameter
    Delete {
        key: String,
    },

    /// Print the fullpath a key normalizes to
    Path {
        key: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
