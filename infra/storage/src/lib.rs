//! A namespacing and lifecycle layer over a flat, shared, string-to-string host store in the
//! shape of a browser's `localStorage`.
//!
//! Several independent components of one application can share the same host store without
//! trampling each other: every entry lives under `namespace ++ group ++ key`, carries an optional
//! expiry and may be lightly obfuscated. Deletion works at every scope, from a single key up to
//! the whole host.
//!
//! # Core Features
//!
//! - **Namespacing & Grouping**: Physical keys are derived from an instance namespace and a
//!   switchable group, so `delete_all_mine` removes exactly what this namespace wrote.
//! - **Lazy Expiry**: Values are wrapped in a `{"result": .., "outDate": ..}` envelope; expired
//!   entries read as absent without being purged.
//! - **Obfuscation**: The `*_encrypted` operations XOR every UTF-16 unit with the last code unit
//!   of the instance secret. This hides values from casual inspection and is **not** encryption.
//! - **Pluggable Hosts**: [`MemoryStore`] for tests, [`FileStore`] for durable native storage with
//!   atomic writes, and `BrowserStore` for `window.localStorage` on `wasm32`.
//!
//! # Architectural Overview
//!
//! 1.  **[`NamespacedStore`]**: The public operations (get, set, encrypted variants, scoped
//!     deletes).
//! 2.  **[`StoreBuilder`]**: A type-safe fluent builder for namespace, group, secret and clock.
//! 3.  **[`HostStore`]**: The seam to the underlying key-value store.
//! 4.  **[`envelope`]**, [`Expiry`], [`transform`]: The codecs, usable on their own.
//!
//! # Examples
//!
//! ```rust
//! use mxp_storage::{Expiry, HostStore, MemoryStore, NamespacedStore, StorageError};
//!
//! # fn main() -> Result<(), StorageError> {
//! let host = MemoryStore::new();
//! host.write("unrelated", "kept")?;
//!
//! let mut store = NamespacedStore::builder()
//!     .host(host.clone())
//!     .namespace("app")
//!     .group("prefs")
//!     .secret("s3cr3t")
//!     .build()?;
//!
//! store.set("volume", &0.8, Expiry::from("2999-01-01"))?;
//! store.set_encrypted("token", &"abc", None)?;
//! let raw = host.read("appprefsvolume")?.unwrap_or_default();
//! assert!(raw.starts_with(r#"{"result":0.8,"outDate":"#));
//! assert_eq!(store.get_encrypted::<String>("token").as_deref(), Some("abc"));
//!
//! store.set_group("cache");
//! store.set("page", &1, None)?;
//!
//! assert_eq!(store.delete_all_mine()?, 3);
//! assert_eq!(host.read("unrelated")?.as_deref(), Some("kept"));
//! # Ok(())
//! # }
//! ```
//!
//! A durable native host:
//!
//! ```rust
//! use mxp_storage::{FileStore, NamespacedStore, StorageError};
//!
//! # fn main() -> Result<(), StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let host = FileStore::builder().path(tmp.path().join("local.json")).open()?;
//! let store = NamespacedStore::new(host);
//! store.set("greeting", &"hello", None)?;
//! assert_eq!(store.get::<String>("greeting").as_deref(), Some("hello"));
//! # Ok(())
//! # }
//! ```

mod builder;
mod clock;
mod engine;
pub mod envelope;
mod error;
mod expiry;
mod host;
mod maintenance;
mod namespace;
mod security;

pub use builder::StoreBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::NamespacedStore;
pub use envelope::Decoded;
pub use error::{StorageError, StorageErrorExt};
pub use expiry::{Expiry, MAX_DATE_MILLIS};
#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub use host::BrowserStore;
pub use host::{FileStore, FileStoreBuilder, HostStore, MemoryStore};
pub use maintenance::delete_by_prefix;
pub use namespace::{DEFAULT_GROUP, DEFAULT_NAMESPACE, DEFAULT_SECRET, physical_key};
pub use security::{transform, transform_units};
