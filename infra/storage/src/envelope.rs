//! The persisted wrapper around every stored value.
//!
//! ```text
//! {"result": <value>, "outDate": <epoch ms>}
//! ```
//!
//! `outDate` is omitted when the entry never expires; an `outDate` of `0` also means "never".
//! Expiry is lazy: an expired envelope stays in the host store until something overwrites or
//! deletes it, but it no longer decodes to a value.

use crate::error::{StorageError, StorageErrorExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

const RESULT_FIELD: &str = "result";
const OUT_DATE_FIELD: &str = "outDate";

#[derive(Serialize)]
struct Envelope<'a, T: ?Sized> {
    result: &'a T,
    #[serde(rename = "outDate", skip_serializing_if = "Option::is_none")]
    out_date: Option<i64>,
}

/// Outcome of decoding a stored envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    /// A live value of the requested type.
    Value(T),
    /// Well-formed, but expired or holding no value.
    Absent,
    /// Not an envelope at all, or the value does not fit the requested type.
    Malformed,
}

impl<T> Decoded<T> {
    /// Collapses the outcome into the public "`None` means absent" contract.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Malformed => None,
        }
    }
}

/// Serializes `value` into envelope text, attaching `out_date` when present.
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if `value` cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn encode<T: Serialize + ?Sized>(
    value: &T,
    out_date: Option<i64>,
) -> Result<String, StorageError> {
    serde_json::to_string(&Envelope { result: value, out_date }).context("Encoding envelope")
}

/// Parses envelope text and extracts the stored value as of `now_millis`.
///
/// Never fails: unexpected shapes report [`Decoded::Malformed`], expired entries and `null`
/// results report [`Decoded::Absent`].
pub fn decode<T: DeserializeOwned>(text: &str, now_millis: i64) -> Decoded<T> {
    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(text) else {
        return Decoded::Malformed;
    };
    let Some(result) = fields.remove(RESULT_FIELD) else {
        return Decoded::Malformed;
    };

    match expired(&fields, now_millis) {
        Some(true) => return Decoded::Absent,
        Some(false) => {},
        None => return Decoded::Malformed,
    }

    // Only booleans, numbers, strings, objects and arrays are values.
    if result.is_null() {
        return Decoded::Absent;
    }

    serde_json::from_value(result).map_or(Decoded::Malformed, Decoded::Value)
}

/// `Some(expired)` for a readable `outDate`, `None` when the field has the wrong type.
fn expired(fields: &Map<String, Value>, now_millis: i64) -> Option<bool> {
    match fields.get(OUT_DATE_FIELD) {
        None | Some(Value::Null) => Some(false),
        Some(Value::Number(out_date)) => Some(is_past(out_date, now_millis)),
        Some(_) => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn is_past(out_date: &Number, now_millis: i64) -> bool {
    if let Some(out_date) = out_date.as_i64() {
        return out_date != 0 && now_millis > out_date;
    }
    out_date.as_f64().is_some_and(|out_date| out_date != 0.0 && now_millis as f64 > out_date)
}
