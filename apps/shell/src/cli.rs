//! # CLI Argument Definitions

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "mxp")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Read, write and clean up namespaced entries in a local key-value store")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: StoreCommand,
}

/// Flags shared by every subcommand. They override the configuration file and environment.
#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    /// Configuration file (defaults to `mxp.toml` in the working directory, if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON document backing the host store
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Namespace shared by every entry this tool writes
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// Group used for keys and group-scoped deletion
    #[arg(short, long, global = true)]
    pub group: Option<String>,

    /// Obfuscation secret for `--encrypt`
    #[arg(long, global = true, env = "MXP_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// More log output on stderr (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Enumeration of the store operations.
#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// Print the value stored under a key as JSON (`null` when absent or expired)
    Get {
        key: String,
        /// Read an obfuscated entry
        #[arg(short, long)]
        encrypt: bool,
    },
    /// Store a value (parsed as JSON, otherwise taken as a plain string)
    Set {
        key: String,
        value: String,
        /// Obfuscate the stored entry
        #[arg(short, long)]
        encrypt: bool,
        /// Expiry as epoch milliseconds, `YYYY-MM-DD[ HH:MM[:SS]]` or RFC 3339
        #[arg(long, value_name = "WHEN", conflicts_with = "ttl")]
        expires: Option<String>,
        /// Expire after this many seconds
        #[arg(long, value_name = "SECONDS")]
        ttl: Option<u64>,
    },
    /// Delete a key of the current group
    #[command(alias = "delete")]
    Del { key: String },
    /// Delete every entry of a group (the current group by default)
    DeleteGroup { group: Option<String> },
    /// Delete every entry of the namespace, across all groups
    DeleteMine,
    /// Remove every entry in the host store, including foreign ones
    Clear {
        /// Confirm the destructive operation
        #[arg(long)]
        yes: bool,
    },
    /// List the keys of the current group
    Keys,
}
