#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the mxp crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! mxp-derive = { path = "../infra/derive" }
//! ```
//!
//! The macro examples are `ignore`d to avoid compiling in this crate; the
//! `tests/` directory carries compiled equivalents.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns a plain enum into the crate-level error type used across the workspace.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to `Result<T, Name>` and to `Result<T, Source>` for every wrapped source error.
/// * **Standard Conversions**: Implements `From<Source>` for variants that wrap an upstream
///   error, so `?` works without `map_err`.
/// * **Message Fallback**: Implements `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant is declared.
/// * **Formatting Helper**: Emits a private `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. The item must be an **enum** with **named-field** variants only.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. A variant wrapping an upstream error (a `source` field, or a field tagged `#[source]` or
///    `#[from]`) must also carry `context`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[mxp_derive::mxp_error]
/// pub enum StorageError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Invalid expiry{}: {message}", format_context(.context))]
///     InvalidExpiry { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &std::path::Path) -> Result<String, StorageError> {
///     std::fs::read_to_string(path).context("Reading store snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn mxp_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
