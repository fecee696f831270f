use crate::cli::GlobalArgs;
use config::{Config, Environment, File};
use mxp_storage::{DEFAULT_GROUP, DEFAULT_NAMESPACE, DEFAULT_SECRET};
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_CONFIG_NAME: &str = "mxp";
const DEFAULT_STORE_FILE: &str = "mxp-store.json";
const ENV_PREFIX: &str = "MXP";

#[mxp_derive::mxp_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Everything the shell needs, after layering file, environment and flags.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub store: StoreSection,
    pub log: LogSection,
}

/// Host store location and the identity of this tool's entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: PathBuf,
    pub namespace: String,
    pub group: String,
    pub secret: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_FILE),
            namespace: DEFAULT_NAMESPACE.to_owned(),
            group: DEFAULT_GROUP.to_owned(),
            secret: DEFAULT_SECRET.to_owned(),
        }
    }
}

/// Optional file logging on top of stderr.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub filter: Option<String>,
}

impl ShellConfig {
    /// Loads the layered configuration:
    /// 1. **Base File**: `path` (must exist), or `mxp.toml` in the working directory if present.
    /// 2. **Environment Overrides**: variables prefixed with `MXP__`, nested with `__`
    ///    (e.g. `MXP__STORE__GROUP` maps to `store.group`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Config`] if an explicit file is missing or any source does not
    /// match the expected structure.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.map_or_else(
            || File::with_name(DEFAULT_CONFIG_NAME).required(false),
            |path| File::from(path).required(true),
        );

        let config = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("Failed to build config")?
            .try_deserialize::<Self>()
            .context("Failed to deserialize config")?;

        debug!(store = %config.store.path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_args(mut self, args: &GlobalArgs) -> Self {
        if let Some(path) = &args.store {
            self.store.path.clone_from(path);
        }
        if let Some(namespace) = &args.namespace {
            self.store.namespace.clone_from(namespace);
        }
        if let Some(group) = &args.group {
            self.store.group.clone_from(group);
        }
        if let Some(secret) = &args.secret {
            self.store.secret.clone_from(secret);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_the_storage_defaults() {
        let config = ShellConfig::default();
        assert_eq!(config.store.path, PathBuf::from("mxp-store.json"));
        assert_eq!(config.store.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.store.group, DEFAULT_GROUP);
        assert_eq!(config.store.secret, DEFAULT_SECRET);
        assert!(config.log.directory.is_none());
    }

    #[test]
    fn loads_sections_from_an_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[store]\ngroup = \"from-file\"\nnamespace = \"ns\"\n[log]\njson = true\n")
            .unwrap();

        let config = ShellConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.store.namespace, "ns");
        assert_eq!(config.store.group, "from-file");
        assert_eq!(config.store.secret, DEFAULT_SECRET);
        assert_eq!(config.store.path, PathBuf::from("mxp-store.json"));
        assert!(config.log.json);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = ShellConfig::load(Some(dir.path().join("absent.toml").as_path()));
        assert!(matches!(err, Err(ConfigError::Config { .. })));
    }

    #[test]
    fn flags_override_loaded_values() {
        let args = GlobalArgs {
            store: Some(PathBuf::from("/tmp/other.json")),
            group: Some("cli".into()),
            ..GlobalArgs::default()
        };
        let config = ShellConfig::default().with_args(&args);
        assert_eq!(config.store.path, PathBuf::from("/tmp/other.json"));
        assert_eq!(config.store.group, "cli");
        assert_eq!(config.store.namespace, DEFAULT_NAMESPACE);
    }
}
