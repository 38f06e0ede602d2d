use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

const UNKNOWN_BATTERY: i32 = -1;
const MIN_BATTERY: i32 = 0;
const MAX_BATTERY: i32 = 100;

/// Errors returned by battery validation.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum BatteryError {
    /// The value was neither `-1` nor inside `0..=100`.
    #[error("battery percentage {value} is out of range (-1 or {min}..={max})")]
    OutOfRange { value: i32, min: i32, max: i32 },
    /// The textual value was not an integer.
    #[error("battery percentage `{value}` is not an integer")]
    NotANumber { value: String },
}

/// Battery charge as reported by the glasses, or unknown.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(into = "i32")]
pub struct BatteryLevel(Option<u8>);

impl BatteryLevel {
    /// Battery level before the device reported one.
    pub const UNKNOWN: Self = Self(None);

    /// Creates a validated battery level from its raw percentage.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is neither `-1` nor inside `0..=100`.
    ///
    /// ```
    /// use g1sync::BatteryLevel;
    ///
    /// assert_eq!(Some(42), BatteryLevel::new(42)?.percent());
    /// assert_eq!(BatteryLevel::UNKNOWN, BatteryLevel::new(-1)?);
    /// # Ok::<(), g1sync::BatteryError>(())
    /// ```
    pub fn new(value: i32) -> Result<Self, BatteryError> {
        if value == UNKNOWN_BATTERY {
            return Ok(Self::UNKNOWN);
        }
        if !(MIN_BATTERY..=MAX_BATTERY).contains(&value) {
            return Err(BatteryError::OutOfRange {
                value,
                min: MIN_BATTERY,
                max: MAX_BATTERY,
            });
        }

        u8::try_from(value)
            .map(|percent| Self(Some(percent)))
            .map_err(|_| BatteryError::OutOfRange {
                value,
                min: MIN_BATTERY,
                max: MAX_BATTERY,
            })
    }

    /// Returns the known percentage.
    #[must_use]
    pub const fn percent(self) -> Option<u8> {
        self.0
    }

    /// Returns the raw wire value (`-1` when unknown).
    #[must_use]
    pub fn as_raw(self) -> i32 {
        self.0.map_or(UNKNOWN_BATTERY, i32::from)
    }
}

impl From<BatteryLevel> for i32 {
    fn from(value: BatteryLevel) -> Self {
        value.as_raw()
    }
}

impl fmt::Display for BatteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(percent) => write!(f, "{percent}%"),
            None => f.write_str("unknown"),
        }
    }
}

impl FromStr for BatteryLevel {
    type Err = BatteryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("unknown") {
            return Ok(Self::UNKNOWN);
        }
        let raw = trimmed
            .parse::<i32>()
            .map_err(|_| BatteryError::NotANumber {
                value: trimmed.to_string(),
            })?;
        Self::new(raw)
    }
}
