//! Reversible XOR obfuscation for the encrypted read/write paths.
//!
//! This is tamper-resistance against casual inspection only. Every UTF-16 code unit of the
//! input is XORed with a single mask: the **last** code unit of the key. Keys sharing a last
//! character are therefore interchangeable, and an empty key leaves the input untouched.

/// The mask derived from `key`: its last UTF-16 code unit, or `0` for an empty key.
fn mask(key: &str) -> u16 {
    key.encode_utf16().last().unwrap_or(0)
}

/// XORs every code unit of `units` with the mask of `key`.
///
/// Lossless for any input; applying it twice with the same key restores `units`.
#[must_use]
pub fn transform_units(key: &str, units: &[u16]) -> Vec<u16> {
    let mask = mask(key);
    units.iter().map(|unit| unit ^ mask).collect()
}

/// Obfuscates or restores `text` with `key`.
///
/// Returns `None` when the masked code units do not form valid UTF-16. That cannot happen for
/// masks below `0x400` (every ASCII key), because surrogate halves then stay surrogate halves
/// of the same kind.
///
/// ```rust
/// use mxp_storage::transform;
///
/// let hidden = transform("secret", r#"{"result":1}"#).unwrap();
/// assert_ne!(hidden, r#"{"result":1}"#);
/// assert_eq!(transform("secret", &hidden).as_deref(), Some(r#"{"result":1}"#));
/// ```
#[must_use]
pub fn transform(key: &str, text: &str) -> Option<String> {
    if key.is_empty() {
        return Some(text.to_owned());
    }
    let units: Vec<u16> = text.encode_utf16().collect();
    String::from_utf16(&transform_units(key, &units)).ok()
}
