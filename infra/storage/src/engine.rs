//! The namespaced store: key derivation, envelope encoding, optional obfuscation and scoped
//! deletion composed over a [`HostStore`].

use crate::builder::StoreBuilder;
use crate::clock::Clock;
use crate::envelope::{self, Decoded};
use crate::error::StorageError;
use crate::expiry::Expiry;
use crate::host::HostStore;
use crate::maintenance;
use crate::namespace::{self, DEFAULT_GROUP, DEFAULT_SECRET, Namespace};
use crate::security;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A namespaced view over a shared host key-value store.
///
/// Every logical key is stored under `namespace ++ group ++ key`. Values are wrapped in an
/// envelope that may carry an absolute expiry; expired entries read as absent but stay in the
/// host until overwritten or deleted. The `*_encrypted` operations additionally pass the
/// envelope through a reversible XOR obfuscation keyed by the instance secret.
///
/// Reads never fail: a missing, expired, corrupted or foreign entry is `None`. Writes fail only
/// for invalid expiries, unserializable values and host failures.
///
/// # Example
///
/// ```rust
/// use mxp_storage::{Expiry, MemoryStore, NamespacedStore, StorageError};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), StorageError> {
/// let host = MemoryStore::new();
/// let mut store = NamespacedStore::builder().host(host.clone()).group("settings").build()?;
///
/// store.set("theme", &"dark", None)?;
/// store.set("banner", &true, Expiry::from(Duration::from_secs(3600)))?;
/// assert_eq!(store.get::<String>("theme").as_deref(), Some("dark"));
///
/// store.set_encrypted("token", &"abc123", None)?;
/// assert_eq!(store.get_encrypted::<String>("token").as_deref(), Some("abc123"));
///
/// store.set_group("cache");
/// assert_eq!(store.get::<String>("theme"), None);
///
/// store.delete_group(Some("settings"))?;
/// assert!(host.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NamespacedStore<H> {
    host: H,
    namespace: Namespace,
    group: String,
    secret: String,
    clock: Arc<dyn Clock>,
}

impl NamespacedStore<()> {
    #[must_use = "The store is not created until you call .host(..).build()"]
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }
}

impl<H: HostStore> NamespacedStore<H> {
    /// Creates a store over `host` with the default namespace, group, secret and wall clock.
    pub fn new(host: H) -> Self {
        Self::from_parts(
            host,
            Namespace::default(),
            DEFAULT_GROUP.to_owned(),
            DEFAULT_SECRET.to_owned(),
            Arc::new(crate::clock::SystemClock),
        )
    }

    pub(crate) fn from_parts(
        host: H,
        namespace: Namespace,
        group: String,
        secret: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { host, namespace, group, secret, clock }
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_ref()
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Switches the group used by subsequent operations.
    ///
    /// Entries written under the previous group are neither moved nor deleted; they become
    /// visible again once that group is restored.
    pub fn set_group(&mut self, group: impl Into<String>) {
        self.group = group.into();
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Switches the obfuscation secret used by subsequent encrypted operations.
    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.secret = secret.into();
    }

    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// The host key that `key` maps to under the current namespace and group.
    pub fn physical_key(&self, key: impl Display) -> String {
        namespace::physical_key(self.namespace.as_ref(), &self.group, key)
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `None` if the key is missing, expired, not an envelope, holds `null`, does not
    /// deserialize into `T`, or the host fails to read.
    pub fn get<T: DeserializeOwned>(&self, key: impl Display) -> Option<T> {
        let physical = self.physical_key(key);
        let raw = self.read_raw(&physical)?;
        self.open(&physical, &raw)
    }

    /// Stores `value` under `key`, optionally expiring at `expiry`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidExpiry`] if `expiry` is not a valid point in time; nothing is
    /// written and any previous value stays in place.
    /// Returns [`StorageError::Serialization`] if `value` cannot be represented as JSON.
    /// Propagates host write failures.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: impl Display,
        value: &T,
        expiry: impl Into<Option<Expiry>>,
    ) -> Result<(), StorageError> {
        let payload = self.seal(value, expiry.into())?;
        let physical = self.physical_key(key);
        self.host.write(&physical, &payload)?;
        debug!(key = %physical, "Entry stored");
        Ok(())
    }

    /// Reads a value written by [`set_encrypted`](Self::set_encrypted) under the current secret.
    ///
    /// A different secret (strictly: a secret with a different last character) yields `None`.
    pub fn get_encrypted<T: DeserializeOwned>(&self, key: impl Display) -> Option<T> {
        let physical = self.physical_key(key);
        let raw = self.read_raw(&physical)?;
        let Some(plain) = security::transform(&self.secret, &raw) else {
            trace!(key = %physical, "Obfuscated payload is not valid UTF-16 under this secret");
            return None;
        };
        self.open(&physical, &plain)
    }

    /// Stores `value` under `key` in obfuscated form.
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set), plus [`StorageError::InvalidConfiguration`] when the secret's
    /// mask turns the payload into invalid UTF-16 (a secret ending outside the BMP). Nothing is
    /// written in that case.
    pub fn set_encrypted<T: Serialize + ?Sized>(
        &self,
        key: impl Display,
        value: &T,
        expiry: impl Into<Option<Expiry>>,
    ) -> Result<(), StorageError> {
        let payload = self.seal(value, expiry.into())?;
        let hidden = security::transform(&self.secret, &payload).ok_or_else(|| {
            StorageError::InvalidConfiguration {
                message: format!("Secret '{}' cannot mask this entry as valid text", self.secret)
                    .into(),
                context: None,
            }
        })?;
        let physical = self.physical_key(key);
        self.host.write(&physical, &hidden)?;
        debug!(key = %physical, "Encrypted entry stored");
        Ok(())
    }

    /// Deletes the entry stored under `key` in the current group. Missing keys are ignored.
    ///
    /// Only the namespaced key is touched, never a raw host key with the same name.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub fn delete(&self, key: impl Display) -> Result<(), StorageError> {
        let physical = self.physical_key(key);
        self.host.delete(&physical)?;
        debug!(key = %physical, "Entry deleted");
        Ok(())
    }

    /// Deletes every entry of `group`, or of the current group when `None` or empty.
    ///
    /// Returns the number of removed entries; `0` when the resolved group is empty.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub fn delete_group(&self, group: Option<&str>) -> Result<usize, StorageError> {
        let group = group.filter(|g| !g.is_empty()).unwrap_or(&self.group);
        if group.is_empty() {
            return Ok(0);
        }
        maintenance::delete_by_prefix(&self.host, &namespace::group_prefix(self.namespace(), group))
    }

    /// Deletes every entry in this namespace, across every group ever used.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub fn delete_all_mine(&self) -> Result<usize, StorageError> {
        maintenance::delete_by_prefix(&self.host, self.namespace())
    }

    /// Clears the entire host store, including entries this crate never wrote.
    ///
    /// # Errors
    ///
    /// Propagates host failures.
    pub fn delete_everything(&self) -> Result<(), StorageError> {
        self.host.clear()?;
        warn!(namespace = %self.namespace, "Host store cleared");
        Ok(())
    }

    /// Logical keys currently stored in the current group, sorted.
    ///
    /// Expired entries are listed until something removes them.
    ///
    /// # Errors
    ///
    /// Propagates host enumeration failures.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let prefix = namespace::group_prefix(self.namespace(), &self.group);
        let mut keys: Vec<String> = self
            .host
            .keys()?
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_owned))
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn seal<T: Serialize + ?Sized>(
        &self,
        value: &T,
        expiry: Option<Expiry>,
    ) -> Result<String, StorageError> {
        let out_date = match expiry {
            Some(expiry) => expiry.normalize(self.clock.now_millis())?,
            None => None,
        };
        envelope::encode(value, out_date)
    }

    fn read_raw(&self, physical: &str) -> Option<String> {
        match self.host.read(physical) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %physical, error = %err, "Host read failed; treating entry as absent");
                None
            },
        }
    }

    fn open<T: DeserializeOwned>(&self, physical: &str, text: &str) -> Option<T> {
        match envelope::decode(text, self.clock.now_millis()) {
            Decoded::Value(value) => Some(value),
            Decoded::Absent => {
                trace!(key = %physical, "Entry expired or empty");
                None
            },
            Decoded::Malformed => {
                trace!(key = %physical, "Entry is not a readable envelope");
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::host::MemoryStore;
    use serde_json::{Value, json};
    use std::time::Duration;

    const T0: i64 = 1_700_000_000_000;

    fn store_at(
        host: &MemoryStore,
        group: &str,
        clock: &ManualClock,
    ) -> NamespacedStore<MemoryStore> {
        NamespacedStore::builder()
            .host(host.clone())
            .group(group)
            .clock(clock.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn new_uses_defaults() {
        let store = NamespacedStore::new(MemoryStore::new());
        assert_eq!(store.namespace(), namespace::DEFAULT_NAMESPACE);
        assert_eq!(store.group(), DEFAULT_GROUP);
        assert_eq!(store.secret(), DEFAULT_SECRET);
        assert_eq!(store.physical_key("k"), "_MXP_NAMESPACE__MXP_GROUP_k");
    }

    #[test]
    fn empty_builder_values_fall_back() {
        let store = NamespacedStore::builder()
            .host(MemoryStore::new())
            .group("")
            .secret("")
            .build()
            .unwrap();
        assert_eq!(store.group(), DEFAULT_GROUP);
        assert_eq!(store.secret(), DEFAULT_SECRET);
    }

    #[test]
    fn empty_namespace_is_rejected() {
        let err = NamespacedStore::builder().host(MemoryStore::new()).namespace("").build();
        assert!(matches!(err, Err(StorageError::InvalidConfiguration { .. })));
    }

    #[test]
    fn writes_the_compatible_envelope() {
        let host = MemoryStore::new();
        let clock = ManualClock::new(T0);
        let store = store_at(&host, "g", &clock);

        store.set("plain", &json!({"a": 1}), None).unwrap();
        store.set("timed", &1, Expiry::from(Duration::from_millis(5))).unwrap();

        assert_eq!(
            host.read("_MXP_NAMESPACE_gplain").unwrap().as_deref(),
            Some(r#"{"result":{"a":1}}"#)
        );
        assert_eq!(
            host.read("_MXP_NAMESPACE_gtimed").unwrap(),
            Some(format!(r#"{{"result":1,"outDate":{}}}"#, T0 + 5))
        );
    }

    #[test]
    fn expiry_boundary() {
        let host = MemoryStore::new();
        let clock = ManualClock::new(T0);
        let store = store_at(&host, "g", &clock);

        store.set("k", &"v", Expiry::Timestamp(T0 + 100)).unwrap();
        clock.set(T0 + 50);
        assert_eq!(store.get::<String>("k").as_deref(), Some("v"));
        clock.set(T0 + 100);
        assert_eq!(store.get::<String>("k").as_deref(), Some("v"));
        clock.set(T0 + 150);
        assert_eq!(store.get::<String>("k"), None);
        assert!(host.read("_MXP_NAMESPACE_gk").unwrap().is_some(), "expiry is lazy");
    }

    #[test]
    fn invalid_expiry_keeps_previous_value() {
        let host = MemoryStore::new();
        let store = store_at(&host, "g", &ManualClock::new(T0));

        store.set("k", &"old", None).unwrap();
        let err = store.set("k", &"new", Expiry::from("not-a-date")).unwrap_err();
        assert!(matches!(err, StorageError::InvalidExpiry { .. }));
        let err = store.set_encrypted("k", &"new", Expiry::Parts(vec![2021])).unwrap_err();
        assert!(matches!(err, StorageError::InvalidExpiry { .. }));
        assert_eq!(store.get::<String>("k").as_deref(), Some("old"));
    }

    #[test]
    fn encrypted_round_trip_and_wrong_secret() {
        let host = MemoryStore::new();
        let mut store = store_at(&host, "g", &ManualClock::new(T0));
        store.set_secret("alpha");

        store.set_encrypted("k", &json!({"n": [1, 2, 3]}), None).unwrap();
        let raw = host.read("_MXP_NAMESPACE_gk").unwrap().unwrap();
        assert!(!raw.contains("result"), "payload must not be stored in clear");
        assert_eq!(store.get_encrypted::<Value>("k"), Some(json!({"n": [1, 2, 3]})));
        assert_eq!(store.get::<Value>("k"), None);

        store.set_secret("bravo");
        assert_eq!(store.get_encrypted::<Value>("k"), None);
    }

    #[test]
    fn unmaskable_secret_is_rejected_without_writing() {
        let host = MemoryStore::new();
        let mut store = store_at(&host, "g", &ManualClock::new(T0));
        store.set_encrypted("k", &"old", None).unwrap();
        let before = host.read("_MXP_NAMESPACE_gk").unwrap();

        store.set_secret("key😀");
        let err = store.set_encrypted("k", &"new", None).unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfiguration { .. }));
        assert_eq!(host.read("_MXP_NAMESPACE_gk").unwrap(), before);

        store.set_secret(DEFAULT_SECRET);
        assert_eq!(store.get_encrypted::<String>("k").as_deref(), Some("old"));
    }

    #[test]
    fn empty_secret_stores_plain_envelopes() {
        let host = MemoryStore::new();
        let mut store = store_at(&host, "g", &ManualClock::new(T0));
        store.set_secret("");
        store.set_encrypted("k", &5, None).unwrap();
        assert_eq!(store.get::<i32>("k"), Some(5));
        assert_eq!(store.get_encrypted::<i32>("k"), Some(5));
    }

    #[test]
    fn delete_group_defaults_to_current_group() {
        let host = MemoryStore::new();
        let clock = ManualClock::new(T0);
        let mut store = store_at(&host, "g1", &clock);
        store.set("a", &1, None).unwrap();
        store.set_group("g2");
        store.set("a", &2, None).unwrap();

        assert_eq!(store.delete_group(None).unwrap(), 1);
        assert_eq!(store.delete_group(Some("")).unwrap(), 0);
        store.set_group("g1");
        assert_eq!(store.get::<i32>("a"), Some(1));
    }

    #[test]
    fn empty_current_group_deletes_nothing() {
        let host: MemoryStore = [("_MXP_NAMESPACE_x", "{}")].into_iter().collect();
        let mut store = store_at(&host, "g", &ManualClock::new(T0));
        store.set_group("");
        assert_eq!(store.delete_group(None).unwrap(), 0);
        assert_eq!(host.len(), 1);
    }

    #[test]
    fn keys_lists_current_group_only() {
        let host = MemoryStore::new();
        let mut store = store_at(&host, "g", &ManualClock::new(T0));
        store.set("b", &1, None).unwrap();
        store.set("a", &1, None).unwrap();
        store.set_group("h");
        store.set("c", &1, None).unwrap();
        store.set_group("g");
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn null_values_read_as_absent() {
        let host = MemoryStore::new();
        let store = store_at(&host, "g", &ManualClock::new(T0));
        store.set("k", &Option::<i32>::None, None).unwrap();
        assert_eq!(store.get::<Value>("k"), None);
    }
}
