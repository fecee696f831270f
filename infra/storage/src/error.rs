use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
///
/// Only [`StorageError::StoreUnavailable`] and [`StorageError::InvalidExpiry`] describe
/// caller-facing failures of the component itself. The remaining variants surface host-side
/// failures (disk, browser exceptions) and values that cannot be serialized at all.
/// Read paths never return any of them: corrupted or foreign data reads as absent.
#[mxp_derive::mxp_error]
pub enum StorageError {
    /// The host store does not exist in this runtime.
    #[error("Host store unavailable{}: {message}", format_context(.context))]
    StoreUnavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A caller-supplied expiry could not be normalized to a point in time.
    #[error("Invalid expiry{}: {message}", format_context(.context))]
    InvalidExpiry { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The store was configured with values it cannot operate on.
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Serialization failure{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// The host store rejected an operation (e.g. a quota exception thrown by the browser).
    #[error("Host store failure{}: {message}", format_context(.context))]
    Backend { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
