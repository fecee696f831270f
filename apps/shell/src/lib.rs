//! # mxp shell
//!
//! The `mxp` command-line tool: every store operation over a JSON-file host store, with the
//! namespace, group and secret taken from `mxp.toml`, `MXP__*` environment variables and flags,
//! in increasing priority.

pub mod cli;
pub mod commands;
pub mod config;

pub use crate::cli::{Cli, GlobalArgs, StoreCommand};
pub use crate::config::{ConfigError, LogSection, ShellConfig, StoreSection};

use anyhow::{Context, Result};
use mxp_logger::{Logger, LoggerError, level_from_verbosity};
use mxp_storage::{FileStore, NamespacedStore};
use std::io::{IsTerminal, Write};

/// Opens (creating if needed) the file-backed store described by `section`.
///
/// # Errors
///
/// Fails when the store file cannot be created or parsed, or the namespace is empty.
pub fn open_store(section: &StoreSection) -> Result<NamespacedStore<FileStore>> {
    let host = FileStore::builder()
        .path(&section.path)
        .open()
        .with_context(|| format!("Cannot open store {}", section.path.display()))?;

    Ok(NamespacedStore::builder()
        .host(host)
        .namespace(section.namespace.as_str())
        .group(section.group.as_str())
        .secret(section.secret.as_str())
        .build()?)
}

/// Installs the global subscriber: stderr always, plus rolling files when configured.
///
/// # Errors
///
/// Propagates [`LoggerError`] from initialization.
pub fn init_logger(log: &LogSection, args: &GlobalArgs) -> Result<Logger, LoggerError> {
    let builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(level_from_verbosity(args.verbose, args.quiet))
        .ansi(std::io::stderr().is_terminal());
    let builder = match &log.filter {
        Some(filter) => builder.env_filter(filter.as_str()),
        None => builder,
    };

    match &log.directory {
        Some(directory) if log.json => builder.directory(directory).json().init(),
        Some(directory) => builder.directory(directory).init(),
        None => builder.init(),
    }
}

/// Loads configuration, opens the store and executes the parsed command.
///
/// # Errors
///
/// Any configuration, store or command failure.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = ShellConfig::load(cli.global.config.as_deref())?.with_args(&cli.global);
    let _logger = init_logger(&config.log, &cli.global)?;

    let store = open_store(&config.store)?;
    commands::execute(&store, cli.command, out)
}
