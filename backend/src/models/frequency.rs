//! Observing frequency quantities and the frequency normalizer.
//!
//! The canonical unit is MHz. `qtty` models angular frequency only, so radio
//! frequency gets its own small quantity type here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PulsarDbError, PulsarDbResult};

/// Canonical observing frequency in megahertz.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MegaHertz(f64);

impl MegaHertz {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for MegaHertz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MHz", self.0)
    }
}

/// Radio frequency units accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyUnit {
    Hz,
    KHz,
    MHz,
    GHz,
}

impl FrequencyUnit {
    /// Multiplier converting a value in this unit to MHz.
    pub const fn to_mhz_factor(self) -> f64 {
        match self {
            Self::Hz => 1e-6,
            Self::KHz => 1e-3,
            Self::MHz => 1.0,
            Self::GHz => 1e3,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Hz => "Hz",
            Self::KHz => "kHz",
            Self::MHz => "MHz",
            Self::GHz => "GHz",
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = PulsarDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hz" => Ok(Self::Hz),
            "khz" => Ok(Self::KHz),
            "mhz" => Ok(Self::MHz),
            "ghz" => Ok(Self::GHz),
            other => Err(PulsarDbError::validation(format!(
                "unknown frequency unit '{}'",
                other
            ))),
        }
    }
}

/// A frequency with an explicit unit, e.g. `1.4 GHz`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frequency {
    pub value: f64,
    pub unit: FrequencyUnit,
}

impl Frequency {
    pub fn new(value: f64, unit: FrequencyUnit) -> Self {
        Self { value, unit }
    }

    pub fn mhz(value: f64) -> Self {
        Self::new(value, FrequencyUnit::MHz)
    }

    pub fn ghz(value: f64) -> Self {
        Self::new(value, FrequencyUnit::GHz)
    }

    pub fn to_megahertz(&self) -> MegaHertz {
        MegaHertz(self.value * self.unit.to_mhz_factor())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit.symbol())
    }
}

/// A frequency value as handed in by a caller, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum FrequencyInput {
    Quantity(Frequency),
    /// Bare number, interpreted as MHz.
    Numeric(f64),
    /// `"1400"`, `"1400 MHz"`, `"1.4GHz"`.
    Text(String),
}

impl From<Frequency> for FrequencyInput {
    fn from(v: Frequency) -> Self {
        Self::Quantity(v)
    }
}

impl From<MegaHertz> for FrequencyInput {
    fn from(v: MegaHertz) -> Self {
        Self::Quantity(Frequency::mhz(v.value()))
    }
}

impl From<f64> for FrequencyInput {
    fn from(v: f64) -> Self {
        Self::Numeric(v)
    }
}

impl From<&str> for FrequencyInput {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Suffixes checked longest-first so `mhz` is not read as `hz`.
const UNIT_SUFFIXES: &[(&str, FrequencyUnit)] = &[
    ("ghz", FrequencyUnit::GHz),
    ("mhz", FrequencyUnit::MHz),
    ("khz", FrequencyUnit::KHz),
    ("hz", FrequencyUnit::Hz),
];

/// Normalize any supported frequency input to MHz.
///
/// # Errors
/// [`PulsarDbError::Validation`] when the value cannot be parsed, is
/// non-finite, or is not strictly positive.
pub fn normalize_frequency(value: &FrequencyInput) -> PulsarDbResult<MegaHertz> {
    let mhz = match value {
        FrequencyInput::Quantity(q) => q.to_megahertz(),
        FrequencyInput::Numeric(v) => MegaHertz(*v),
        FrequencyInput::Text(text) => parse_frequency_str(text)?.to_megahertz(),
    };
    check_positive(mhz)
}

fn parse_frequency_str(raw: &str) -> PulsarDbResult<Frequency> {
    let lower = raw.trim().to_ascii_lowercase();
    let (number, unit) = UNIT_SUFFIXES
        .iter()
        .find_map(|(suffix, unit)| lower.strip_suffix(suffix).map(|n| (n.trim(), *unit)))
        .unwrap_or((lower.as_str(), FrequencyUnit::MHz));

    let value = number.parse::<f64>().map_err(|_| {
        PulsarDbError::validation(format!("cannot parse frequency value '{}'", raw))
    })?;
    Ok(Frequency::new(value, unit))
}

fn check_positive(mhz: MegaHertz) -> PulsarDbResult<MegaHertz> {
    if !mhz.value().is_finite() {
        return Err(PulsarDbError::validation(format!(
            "frequency must be finite, got {}",
            mhz.value()
        )));
    }
    if mhz.value() <= 0.0 {
        return Err(PulsarDbError::validation(format!(
            "frequency must be positive, got {}",
            mhz
        )));
    }
    Ok(mhz)
}
