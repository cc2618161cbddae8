//! Loosely-typed parameter bags used for both query filters and post fields.
//!
//! Callers hand in whatever they have (strings from a command line, numbers,
//! `qtty` quantities, datetimes); typed accessors normalize on the way out.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{PulsarDbError, PulsarDbResult};
use crate::models::{
    normalize_frequency, normalize_time, Frequency, FrequencyInput, MegaHertz, ModifiedJulianDate,
    TimeInput,
};

/// A single parameter value as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
    Time(TimeInput),
    Frequency(FrequencyInput),
    Duration(qtty::Seconds),
}

impl ParamValue {
    /// Short type name for error messages.
    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::List(_) => "list",
            Self::Time(_) => "time",
            Self::Frequency(_) => "frequency",
            Self::Duration(_) => "duration",
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(v: [&str; N]) -> Self {
        Self::List(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<ModifiedJulianDate> for ParamValue {
    fn from(v: ModifiedJulianDate) -> Self {
        Self::Time(TimeInput::Mjd(v))
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Time(TimeInput::DateTime(v))
    }
}

impl From<TimeInput> for ParamValue {
    fn from(v: TimeInput) -> Self {
        Self::Time(v)
    }
}

impl From<Frequency> for ParamValue {
    fn from(v: Frequency) -> Self {
        Self::Frequency(FrequencyInput::Quantity(v))
    }
}

impl From<MegaHertz> for ParamValue {
    fn from(v: MegaHertz) -> Self {
        Self::Frequency(v.into())
    }
}

impl From<qtty::Seconds> for ParamValue {
    fn from(v: qtty::Seconds) -> Self {
        Self::Duration(v)
    }
}

impl From<qtty::Degrees> for ParamValue {
    fn from(v: qtty::Degrees) -> Self {
        Self::Number(v.value())
    }
}

/// Named parameters. Keys are kept sorted so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A repeated key accumulates into a list, the way a
    /// repeated query-string key would.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.values.remove(&key) {
            None => {
                self.values.insert(key, value);
            }
            Some(existing) => {
                let mut merged = scalar_strings(existing);
                merged.extend(scalar_strings(value));
                self.values.insert(key, ParamValue::List(merged));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// A single text value. Lists of exactly one element are accepted.
    pub fn text(&self, key: &str) -> PulsarDbResult<Option<String>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ParamValue::Text(s)) => Ok(Some(s.clone())),
            Some(ParamValue::List(items)) if items.len() == 1 => Ok(items.first().cloned()),
            Some(other) => Err(PulsarDbError::validation(format!(
                "parameter '{}' expects a single text value, got {}",
                key,
                other.kind()
            ))),
        }
    }

    /// One or more text values. Scalars become a one-element list.
    pub fn list(&self, key: &str) -> PulsarDbResult<Option<Vec<String>>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(ParamValue::Text(s)) => Ok(Some(vec![s.clone()])),
            Some(ParamValue::List(items)) => Ok(Some(items.clone())),
            Some(other) => Err(PulsarDbError::validation(format!(
                "parameter '{}' expects text values, got {}",
                key,
                other.kind()
            ))),
        }
    }

    pub fn number(&self, key: &str) -> PulsarDbResult<Option<f64>> {
        let value = match self.values.get(key) {
            None => return Ok(None),
            Some(ParamValue::Number(v)) => *v,
            Some(ParamValue::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
                PulsarDbError::validation(format!("parameter '{}' is not a number: '{}'", key, s))
            })?,
            Some(other) => {
                return Err(PulsarDbError::validation(format!(
                    "parameter '{}' expects a number, got {}",
                    key,
                    other.kind()
                )))
            }
        };
        if !value.is_finite() {
            return Err(PulsarDbError::validation(format!(
                "parameter '{}' must be finite",
                key
            )));
        }
        Ok(Some(value))
    }

    /// Normalized time value.
    pub fn time(&self, key: &str) -> PulsarDbResult<Option<ModifiedJulianDate>> {
        let input = match self.values.get(key) {
            None => return Ok(None),
            Some(ParamValue::Time(t)) => t.clone(),
            Some(ParamValue::Number(v)) => TimeInput::Numeric(*v),
            Some(ParamValue::Text(s)) => TimeInput::Text(s.clone()),
            Some(other) => {
                return Err(PulsarDbError::validation(format!(
                    "parameter '{}' expects a time, got {}",
                    key,
                    other.kind()
                )))
            }
        };
        normalize_time(&input).map(Some)
    }

    /// Normalized frequency value.
    pub fn frequency(&self, key: &str) -> PulsarDbResult<Option<MegaHertz>> {
        let input = match self.values.get(key) {
            None => return Ok(None),
            Some(ParamValue::Frequency(f)) => f.clone(),
            Some(ParamValue::Number(v)) => FrequencyInput::Numeric(*v),
            Some(ParamValue::Text(s)) => FrequencyInput::Text(s.clone()),
            Some(other) => {
                return Err(PulsarDbError::validation(format!(
                    "parameter '{}' expects a frequency, got {}",
                    key,
                    other.kind()
                )))
            }
        };
        normalize_frequency(&input).map(Some)
    }

    /// A duration; bare numbers and numeric strings are seconds.
    pub fn duration(&self, key: &str) -> PulsarDbResult<Option<qtty::Seconds>> {
        match self.values.get(key) {
            Some(ParamValue::Duration(d)) => {
                if d.value().is_finite() {
                    Ok(Some(*d))
                } else {
                    Err(PulsarDbError::validation(format!(
                        "parameter '{}' must be finite",
                        key
                    )))
                }
            }
            _ => Ok(self.number(key)?.map(qtty::Seconds::new)),
        }
    }
}

fn scalar_strings(value: ParamValue) -> Vec<String> {
    match value {
        ParamValue::List(items) => items,
        ParamValue::Text(s) => vec![s],
        ParamValue::Number(v) => vec![v.to_string()],
        ParamValue::Time(TimeInput::Text(s)) => vec![s],
        ParamValue::Time(t) => vec![format!("{:?}", t)],
        ParamValue::Frequency(FrequencyInput::Text(s)) => vec![s],
        ParamValue::Frequency(f) => vec![format!("{:?}", f)],
        ParamValue::Duration(d) => vec![d.value().to_string()],
    }
}
