//! Expiry normalization.
//!
//! Callers describe "when does this entry stop being readable" in several shapes; all of them are
//! reduced to absolute epoch milliseconds before they reach the envelope.

use crate::error::StorageError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use std::time::{Duration, SystemTime};

/// Largest distance from the epoch, in milliseconds, that still denotes a valid date
/// (the range of an ECMAScript `Date`).
pub const MAX_DATE_MILLIS: i64 = 8_640_000_000_000_000;

const DATE_TIME_FORMATS: [&str; 2] = ["%Y/%m/%d %H:%M:%S", "%Y/%m/%d %H:%M"];
const DATE_FORMAT: &str = "%Y/%m/%d";

/// The moment an entry expires.
///
/// | Variant | Meaning |
/// |---|---|
/// | [`Expiry::At`] | An already constructed point in time, used as-is. |
/// | [`Expiry::Timestamp`] | Epoch milliseconds. `0` means "never expires". |
/// | [`Expiry::Parts`] | `[year, month_index, day, hour?, minute?, second?, millisecond?]` in local time, zero-based month; out-of-range components carry over. |
/// | [`Expiry::Text`] | `YYYY-MM-DD` / `YYYY/MM/DD` (local midnight), optionally followed by ` HH:MM[:SS]`, or an RFC 3339 timestamp. |
/// | [`Expiry::After`] | A duration relative to the store clock. |
///
/// ```rust
/// use mxp_storage::Expiry;
///
/// let at_noon = Expiry::from("2030/01/15 12:00");
/// let ttl = Expiry::from(std::time::Duration::from_secs(60));
/// let parts = Expiry::from([2030, 0, 15]);
/// # let _ = (at_noon, ttl, parts);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    At(DateTime<Utc>),
    Timestamp(i64),
    Parts(Vec<i64>),
    Text(String),
    After(Duration),
}

impl Expiry {
    /// Resolves this expiry to absolute epoch milliseconds.
    ///
    /// Returns `Ok(None)` for `Timestamp(0)`, which stores the entry without an expiry.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidExpiry`] if the value does not describe a valid point in
    /// time.
    pub fn normalize(&self, now_millis: i64) -> Result<Option<i64>, StorageError> {
        let millis = match self {
            Self::At(at) => at.timestamp_millis(),
            Self::Timestamp(0) => return Ok(None),
            Self::Timestamp(millis) => *millis,
            Self::Parts(parts) => from_parts(parts)?,
            Self::Text(text) => from_text(text)?,
            Self::After(ttl) => i64::try_from(ttl.as_millis())
                .ok()
                .and_then(|ttl| now_millis.checked_add(ttl))
                .ok_or_else(|| invalid(format!("{ttl:?} from now is out of range")))?,
        };

        if millis.abs() > MAX_DATE_MILLIS {
            return Err(invalid(format!("{millis} ms is outside the representable date range")));
        }

        Ok(Some(millis))
    }
}

fn from_parts(parts: &[i64]) -> Result<i64, StorageError> {
    if !(3..=7).contains(&parts.len()) {
        return Err(invalid(format!(
            "expected 3 to 7 date components, got {}",
            parts.len()
        )));
    }

    let component = |idx: usize| parts.get(idx).copied().unwrap_or(0);

    // Out-of-range components carry into the next larger unit, as date objects do.
    let total_months = component(0).checked_mul(12).and_then(|m| m.checked_add(component(1)));
    let naive = total_months
        .and_then(|months| {
            let year = i32::try_from(months.div_euclid(12)).ok()?;
            let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;
            NaiveDate::from_ymd_opt(year, month, 1)
        })
        .and_then(|first| {
            let days = TimeDelta::try_days(component(2).checked_sub(1)?)?;
            first.checked_add_signed(days)
        })
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| {
            let offset = TimeDelta::try_hours(component(3))?
                .checked_add(&TimeDelta::try_minutes(component(4))?)?
                .checked_add(&TimeDelta::try_seconds(component(5))?)?;
            midnight.checked_add_signed(offset)
        });

    naive
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .and_then(|local| local.timestamp_millis().checked_add(component(6)))
        .ok_or_else(|| invalid(format!("{parts:?} is not a representable local date")))
}

fn from_text(text: &str) -> Result<i64, StorageError> {
    let text = text.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.timestamp_millis());
    }

    // Dashes are accepted as well as slashes; both parse as local time.
    let slashed = text.replace('-', "/");

    let naive = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&slashed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&slashed, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });

    naive
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.timestamp_millis())
        .ok_or_else(|| invalid(format!("'{text}' is not a recognised date")))
}

fn invalid(message: String) -> StorageError {
    StorageError::InvalidExpiry { message: message.into(), context: None }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Expiry {
    fn from(at: DateTime<Tz>) -> Self {
        Self::At(at.with_timezone(&Utc))
    }
}

impl From<SystemTime> for Expiry {
    fn from(at: SystemTime) -> Self {
        Self::At(at.into())
    }
}

impl From<i64> for Expiry {
    fn from(millis: i64) -> Self {
        Self::Timestamp(millis)
    }
}

impl From<Duration> for Expiry {
    fn from(ttl: Duration) -> Self {
        Self::After(ttl)
    }
}

impl From<&str> for Expiry {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Expiry {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<const N: usize> From<[i64; N]> for Expiry {
    fn from(parts: [i64; N]) -> Self {
        Self::Parts(parts.to_vec())
    }
}

impl From<Vec<i64>> for Expiry {
    fn from(parts: Vec<i64>) -> Self {
        Self::Parts(parts)
    }
}
