//! Execution of parsed subcommands against a namespaced store.

use crate::cli::StoreCommand;
use anyhow::{Context, Result, bail};
use mxp_storage::{Expiry, HostStore, NamespacedStore};
use serde_json::Value;
use std::io::Write;
use std::time::Duration;
use tracing::info;

/// Runs `command` against `store`, writing its result to `out`.
///
/// # Errors
///
/// Fails on invalid expiries, host failures, an unconfirmed `clear`, or when `out` cannot be
/// written.
pub fn execute<H: HostStore>(
    store: &NamespacedStore<H>,
    command: StoreCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        StoreCommand::Get { key, encrypt } => {
            let value: Option<Value> =
                if encrypt { store.get_encrypted(&key) } else { store.get(&key) };
            writeln!(out, "{}", value.unwrap_or(Value::Null))?;
        },
        StoreCommand::Set { key, value, encrypt, expires, ttl } => {
            let value = parse_value(value);
            let expiry = parse_expiry(expires, ttl);
            let stored = if encrypt {
                store.set_encrypted(&key, &value, expiry)
            } else {
                store.set(&key, &value, expiry)
            };
            stored.with_context(|| format!("Failed to store '{key}'"))?;
        },
        StoreCommand::Del { key } => {
            store.delete(&key).with_context(|| format!("Failed to delete '{key}'"))?;
        },
        StoreCommand::DeleteGroup { group } => {
            let removed = store.delete_group(group.as_deref())?;
            writeln!(out, "{removed}")?;
        },
        StoreCommand::DeleteMine => {
            let removed = store.delete_all_mine()?;
            writeln!(out, "{removed}")?;
        },
        StoreCommand::Clear { yes } => {
            if !yes {
                bail!("Refusing to clear the entire host store without --yes");
            }
            store.delete_everything()?;
            info!("Host store cleared");
        },
        StoreCommand::Keys => {
            for key in store.keys()? {
                writeln!(out, "{key}")?;
            }
        },
    }

    Ok(())
}

/// JSON if the argument parses as JSON, otherwise the argument as a plain string.
fn parse_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

/// Epoch milliseconds when `expires` is an integer, date text otherwise; `ttl` is in seconds.
fn parse_expiry(expires: Option<String>, ttl: Option<u64>) -> Option<Expiry> {
    if let Some(ttl) = ttl {
        return Some(Expiry::After(Duration::from_secs(ttl)));
    }
    expires.map(|raw| raw.trim().parse::<i64>().map_or(Expiry::Text(raw), Expiry::Timestamp))
}
