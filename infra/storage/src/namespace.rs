//! Physical key derivation.
//!
//! A physical key is the plain concatenation `namespace ++ group ++ logical_key`. No delimiter is
//! inserted and nothing is escaped, which keeps keys compatible with stores written by earlier
//! releases. As a consequence a group name that is a prefix of another group name plus a key can
//! alias into that group's key space (`"ab" + "c"` and `"a" + "bc"` collide).

use std::fmt::{self, Display, Write as _};

/// Namespace used when none is configured. Marks every key owned by this crate.
pub const DEFAULT_NAMESPACE: &str = "_MXP_NAMESPACE_";

/// Group used when none is configured.
pub const DEFAULT_GROUP: &str = "_MXP_GROUP_";

/// Obfuscation secret used when none is configured.
pub const DEFAULT_SECRET: &str = "_MXP_ENCRYPT_";

/// Derives the physical storage key for `logical` under `namespace` and `group`.
///
/// Any [`Display`] value can serve as the logical key; it is rendered with its `Display` impl.
///
/// ```rust
/// use mxp_storage::physical_key;
///
/// assert_eq!(physical_key("_NS_", "users", "ada"), "_NS_usersada");
/// assert_eq!(physical_key("_NS_", "ids", 42), "_NS_ids42");
/// ```
pub fn physical_key(namespace: &str, group: &str, logical: impl Display) -> String {
    let mut key = String::with_capacity(namespace.len() + group.len() + 16);
    key.push_str(namespace);
    key.push_str(group);
    write!(key, "{logical}").ok();
    key
}

/// The scope prefix covering every key of `group` inside `namespace`.
pub(crate) fn group_prefix(namespace: &str, group: &str) -> String {
    physical_key(namespace, group, "")
}

/// A namespace that is guaranteed to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Namespace(String);

impl Namespace {
    pub(crate) fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (!name.is_empty()).then_some(Self(name))
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self(DEFAULT_NAMESPACE.to_owned())
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves a configured value, falling back to `default` when it is empty.
pub(crate) fn or_default(value: impl Into<String>, default: &str) -> String {
    let value = value.into();
    if value.is_empty() { default.to_owned() } else { value }
}
