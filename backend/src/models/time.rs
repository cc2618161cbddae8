//! Canonical time representation and the time normalizer.
//!
//! All observation windows and time filters are stored and compared as
//! Modified Julian Dates. Callers may hand in an MJD quantity, a UTC datetime,
//! a bare number (assumed MJD) or a string.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PulsarDbError, PulsarDbResult};

/// MJD of the Unix epoch (1970-01-01T00:00:00 UTC).
const UNIX_EPOCH_MJD: f64 = 40587.0;
const SECONDS_PER_DAY: f64 = 86400.0;

/// Modified Julian Date representation.
/// MJD 0 = 1858-11-17 00:00:00 UTC
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ModifiedJulianDate(qtty::Days);

impl ModifiedJulianDate {
    /// Create a new MJD value.
    pub fn new<V: Into<qtty::Days>>(v: V) -> Self {
        Self(v.into())
    }

    /// Raw MJD value as f64.
    pub fn value(&self) -> f64 {
        self.0.value()
    }

    /// Convert to Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn to_unix_timestamp(&self) -> f64 {
        (self.value() - UNIX_EPOCH_MJD) * SECONDS_PER_DAY
    }

    /// Create from Unix timestamp (seconds since 1970-01-01 00:00:00 UTC).
    pub fn from_unix_timestamp(timestamp: f64) -> Self {
        Self::new(timestamp / SECONDS_PER_DAY + UNIX_EPOCH_MJD)
    }

    /// Convert to chrono DateTime<Utc>.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        let secs = self.to_unix_timestamp();
        let secs_i64 = secs.floor() as i64;
        let nanos = ((secs - secs.floor()) * 1e9) as u32;
        DateTime::from_timestamp(secs_i64, nanos).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Create from chrono DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_unix_timestamp(dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9)
    }

    /// Shift by a duration (e.g. an observation length in seconds).
    pub fn offset_by(&self, duration: qtty::Seconds) -> Self {
        let days: qtty::Days = duration.to::<qtty::Day>();
        Self(self.0 + days)
    }
}

impl From<f64> for ModifiedJulianDate {
    fn from(v: f64) -> Self {
        ModifiedJulianDate::new(v)
    }
}

impl std::fmt::Display for ModifiedJulianDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A time value as handed in by a caller, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeInput {
    /// Already an MJD quantity.
    Mjd(ModifiedJulianDate),
    /// A UTC instant.
    DateTime(DateTime<Utc>),
    /// Bare number, interpreted as MJD.
    Numeric(f64),
    /// ISO-8601 / RFC 3339 date or date-time, or an MJD number in text form.
    Text(String),
}

impl From<ModifiedJulianDate> for TimeInput {
    fn from(v: ModifiedJulianDate) -> Self {
        Self::Mjd(v)
    }
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl From<f64> for TimeInput {
    fn from(v: f64) -> Self {
        Self::Numeric(v)
    }
}

impl From<&str> for TimeInput {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Naive date-time layouts accepted in addition to RFC 3339. All are read as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Normalize any supported time input to a Modified Julian Date.
///
/// # Errors
/// [`PulsarDbError::Validation`] when the value is non-finite or the string
/// matches none of the accepted layouts.
pub fn normalize_time(value: &TimeInput) -> PulsarDbResult<ModifiedJulianDate> {
    match value {
        TimeInput::Mjd(mjd) => finite_mjd(mjd.value()),
        TimeInput::DateTime(dt) => Ok(ModifiedJulianDate::from_datetime(*dt)),
        TimeInput::Numeric(v) => finite_mjd(*v),
        TimeInput::Text(text) => parse_time_str(text),
    }
}

fn finite_mjd(value: f64) -> PulsarDbResult<ModifiedJulianDate> {
    if value.is_finite() {
        Ok(ModifiedJulianDate::new(value))
    } else {
        Err(PulsarDbError::validation(format!(
            "time value must be finite, got {}",
            value
        )))
    }
}

fn parse_time_str(raw: &str) -> PulsarDbResult<ModifiedJulianDate> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(PulsarDbError::validation("time value is empty"));
    }

    if let Some(number) = strip_mjd_marker(text) {
        return number
            .parse::<f64>()
            .map_err(|_| PulsarDbError::validation(format!("cannot parse MJD value '{}'", raw)))
            .and_then(finite_mjd);
    }

    if let Ok(v) = text.parse::<f64>() {
        return finite_mjd(v);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(ModifiedJulianDate::from_datetime(dt.with_timezone(&Utc)));
    }

    for layout in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Ok(ModifiedJulianDate::from_datetime(naive.and_utc()));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(ModifiedJulianDate::from_datetime(midnight.and_utc()));
        }
    }

    Err(PulsarDbError::validation(format!(
        "cannot parse time value '{}'",
        raw
    )))
}

/// `MJD 59000`, `59000 MJD`, `mjd59000` -> `59000`.
fn strip_mjd_marker(text: &str) -> Option<&str> {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("mjd") {
        Some(text[3..].trim())
    } else if lower.ends_with("mjd") {
        Some(text[..text.len() - 3].trim())
    } else {
        None
    }
}
