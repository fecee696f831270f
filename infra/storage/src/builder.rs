use crate::clock::{Clock, SystemClock};
use crate::engine::NamespacedStore;
use crate::error::StorageError;
use crate::host::HostStore;
use crate::namespace::{DEFAULT_GROUP, DEFAULT_NAMESPACE, DEFAULT_SECRET, Namespace, or_default};
use private::Sealed;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoreConfig {
    namespace: String,
    group: String,
    secret: String,
    clock: Arc<dyn Clock>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            group: DEFAULT_GROUP.to_owned(),
            secret: DEFAULT_SECRET.to_owned(),
            clock: Arc::new(SystemClock),
        }
    }
}

#[derive(Debug, Default)]
pub struct NoHost;
#[derive(Debug)]
pub struct WithHost<H>(H);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoHost {}
impl<H> Sealed for WithHost<H> {}

/// Type-safe builder for [`NamespacedStore`]; a host store must be supplied before `build`.
#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct StoreBuilder<S: Sealed = NoHost> {
    state: S,
    config: StoreConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> StoreBuilder<S> {
    /// Sets the namespace shared by every instance that should be removable together.
    #[must_use = "Sets the namespace of the store"]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Sets the initial group. An empty group falls back to the default group.
    #[must_use = "Sets the initial group of the store"]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.config.group = or_default(group, DEFAULT_GROUP);
        self
    }

    /// Sets the initial obfuscation secret. An empty secret falls back to the default secret.
    #[must_use = "Sets the obfuscation secret of the store"]
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.config.secret = or_default(secret, DEFAULT_SECRET);
        self
    }

    /// Replaces the wall clock used for expiry decisions.
    #[must_use = "Sets the clock of the store"]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.config.clock = Arc::new(clock);
        self
    }
}

impl StoreBuilder<NoHost> {
    #[must_use = "Creates a new store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the host key-value store"]
    pub fn host<H: HostStore>(self, host: H) -> StoreBuilder<WithHost<H>> {
        StoreBuilder { state: WithHost(host), config: self.config }
    }
}

impl<H: HostStore> StoreBuilder<WithHost<H>> {
    /// Consumes the configuration and returns a ready store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidConfiguration`] if the namespace is empty: an empty
    /// namespace would make "delete everything I created" match every key in the host.
    pub fn build(self) -> Result<NamespacedStore<H>, StorageError> {
        let StoreConfig { namespace, group, secret, clock } = self.config;

        let namespace = Namespace::new(namespace).ok_or(StorageError::InvalidConfiguration {
            message: "Namespace cannot be empty".into(),
            context: None,
        })?;

        debug!(%namespace, %group, "Namespaced store ready");
        Ok(NamespacedStore::from_parts(self.state.0, namespace, group, secret, clock))
    }
}
