//! Evidence codec: raw sensor/user values to ordinal codes.
//!
//! Every network variable is 5-ary; these total, pure functions map
//! temperatures, wind speeds, and qualitative answers onto codes 0-4.
//! The thresholds are load-bearing constants shared with the historical
//! observation datasets; changing any of them invalidates learned tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::state::{SkyCondition, TempBand};

/// Number of states of every network variable.
pub const CARDINALITY: usize = 5;

/// An ordinal code in `[0, 4]`.
///
/// Construction validates the range, so a `Code` in hand is always a legal
/// evidence value and a legal CPT index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Code(u8);

impl Code {
    /// The lowest code.
    pub const MIN: Code = Code(0);
    /// The highest code.
    pub const MAX: Code = Code(4);

    /// Creates a code, rejecting values above 4.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if usize::from(value) < CARDINALITY {
            Ok(Self(value))
        } else {
            Err(ValidationError::CodeOutOfRange {
                value: i64::from(value),
            })
        }
    }

    /// The raw ordinal value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The code as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All codes in ascending order.
    #[must_use]
    pub const fn all() -> [Code; CARDINALITY] {
        [Code(0), Code(1), Code(2), Code(3), Code(4)]
    }
}

impl TryFrom<u8> for Code {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Code> for u8 {
    fn from(code: Code) -> Self {
        code.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wind speed in km/h to code.
///
/// Boundaries are half-open on the left: exactly 16 km/h is still code 0.
#[must_use]
pub fn wind_code(kmh: f64) -> Code {
    if kmh <= 16.0 {
        Code(0)
    } else if kmh <= 21.0 {
        Code(1)
    } else if kmh <= 27.0 {
        Code(2)
    } else if kmh <= 31.0 {
        Code(3)
    } else {
        Code(4)
    }
}

/// Cold-branch temperature in Celsius to code.
///
/// The final arm forces the worst code for any input at or above 15 degrees.
/// Such inputs are outside this branch's domain (the band classifier routes
/// them elsewhere); the forced maximum is the historical fail-safe for
/// out-of-domain callers and is preserved as-is.
#[must_use]
pub fn cold_temp_code(celsius: f64) -> Code {
    if celsius < 5.0 {
        Code(4)
    } else if celsius < 9.0 {
        Code(3)
    } else if celsius < 12.0 {
        Code(2)
    } else if celsius < 15.0 {
        Code(1)
    } else {
        Code(4)
    }
}

/// Hot-branch temperature in Celsius to code.
///
/// Values at or below 26 degrees never occur here by construction (the band
/// classifier only routes temperatures above 26); they map to the mildest
/// code to keep the function total.
#[must_use]
pub fn hot_temp_code(celsius: f64) -> Code {
    if celsius > 42.0 {
        Code(4)
    } else if celsius > 38.0 {
        Code(3)
    } else if celsius > 34.0 {
        Code(2)
    } else if celsius > 31.0 {
        Code(1)
    } else {
        Code(0)
    }
}

/// Qualitative wind answer to code.
///
/// Accepted answers, mildest first: calm, light, breezy, fresh, strong, gale.
/// Calm and light share code 0.
#[must_use]
pub fn wind_answer_code(answer: &str) -> Option<Code> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "calm" | "light" => Some(Code(0)),
        "breezy" => Some(Code(1)),
        "fresh" => Some(Code(2)),
        "strong" => Some(Code(3)),
        "gale" => Some(Code(4)),
        _ => None,
    }
}

/// Accepted qualitative wind answers, in prompt order.
pub const WIND_ANSWERS: [&str; 6] = ["calm", "light", "breezy", "fresh", "strong", "gale"];

/// Qualitative rain-intensity answer to code.
#[must_use]
pub fn rain_answer_code(answer: &str) -> Option<Code> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "none" => Some(Code(0)),
        "light" => Some(Code(1)),
        "moderate" => Some(Code(2)),
        "heavy" => Some(Code(3)),
        "torrential" => Some(Code(4)),
        _ => None,
    }
}

/// Accepted rain-intensity answers, in prompt order.
pub const RAIN_ANSWERS: [&str; 5] = ["none", "light", "moderate", "heavy", "torrential"];

/// Classifies a temperature into its band, applying the critical-conditions
/// override.
///
/// Above 26 degrees is the hot branch, below 15 the cold branch. The
/// in-between band is normal unless the sky shows precipitation or the rain
/// intensity is 3 or higher, in which case the cold branch is forced: a mild
/// temperature under heavy rain is still an adverse session.
#[must_use]
pub fn classify_band(celsius: f64, sky: SkyCondition, rain: Code) -> TempBand {
    if celsius > 26.0 {
        TempBand::Hot(hot_temp_code(celsius))
    } else if celsius < 15.0 {
        TempBand::Cold(cold_temp_code(celsius))
    } else if sky == SkyCondition::Precipitation || rain.value() >= 3 {
        TempBand::Cold(cold_temp_code(celsius))
    } else {
        TempBand::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_rejects_out_of_range() {
        assert!(Code::new(4).is_ok());
        assert!(Code::new(5).is_err());
    }

    #[test]
    fn test_wind_boundaries() {
        assert_eq!(wind_code(0.0).value(), 0);
        assert_eq!(wind_code(16.0).value(), 0);
        assert_eq!(wind_code(16.0001).value(), 1);
        assert_eq!(wind_code(21.0).value(), 1);
        assert_eq!(wind_code(27.0).value(), 2);
        assert_eq!(wind_code(27.5).value(), 3);
        assert_eq!(wind_code(31.0).value(), 3);
        assert_eq!(wind_code(31.1).value(), 4);
    }

    #[test]
    fn test_cold_temp_boundaries() {
        assert_eq!(cold_temp_code(-3.0).value(), 4);
        assert_eq!(cold_temp_code(4.999).value(), 4);
        assert_eq!(cold_temp_code(5.0).value(), 3);
        assert_eq!(cold_temp_code(8.999).value(), 3);
        assert_eq!(cold_temp_code(10.0).value(), 2);
        assert_eq!(cold_temp_code(14.999).value(), 1);
    }

    #[test]
    fn test_cold_temp_out_of_domain_forces_worst() {
        // Historical fail-safe: out-of-domain inputs get the worst code.
        assert_eq!(cold_temp_code(15.0).value(), 4);
        assert_eq!(cold_temp_code(20.0).value(), 4);
    }

    #[test]
    fn test_hot_temp_boundaries() {
        assert_eq!(hot_temp_code(27.0).value(), 0);
        assert_eq!(hot_temp_code(31.0).value(), 0);
        assert_eq!(hot_temp_code(31.5).value(), 1);
        assert_eq!(hot_temp_code(34.5).value(), 2);
        assert_eq!(hot_temp_code(38.5).value(), 3);
        assert_eq!(hot_temp_code(42.5).value(), 4);
    }

    #[test]
    fn test_qualitative_answers() {
        assert_eq!(wind_answer_code("calm").map(Code::value), Some(0));
        assert_eq!(wind_answer_code("light").map(Code::value), Some(0));
        assert_eq!(wind_answer_code("Breezy").map(Code::value), Some(1));
        assert_eq!(wind_answer_code("gale").map(Code::value), Some(4));
        assert_eq!(wind_answer_code("hurricane"), None);

        assert_eq!(rain_answer_code("none").map(Code::value), Some(0));
        assert_eq!(rain_answer_code("torrential").map(Code::value), Some(4));
        assert_eq!(rain_answer_code("drizzle"), None);
    }

    #[test]
    fn test_band_classification() {
        let none = Code::new(0).unwrap();
        assert_eq!(
            classify_band(30.0, SkyCondition::Clear, none),
            TempBand::Hot(Code::new(0).unwrap())
        );
        assert_eq!(
            classify_band(10.0, SkyCondition::Clear, none),
            TempBand::Cold(Code::new(2).unwrap())
        );
        assert_eq!(classify_band(20.0, SkyCondition::Clear, none), TempBand::Normal);
    }

    #[test]
    fn test_band_critical_override() {
        let heavy = Code::new(3).unwrap();
        let none = Code::new(0).unwrap();
        // Mild temperature, but precipitation forces the cold branch.
        assert_eq!(
            classify_band(20.0, SkyCondition::Precipitation, none),
            TempBand::Cold(Code::new(4).unwrap())
        );
        // Likewise for heavy rain intensity under a cloudy sky.
        assert_eq!(
            classify_band(20.0, SkyCondition::Cloudy, heavy),
            TempBand::Cold(Code::new(4).unwrap())
        );
    }

    #[test]
    fn test_band_boundary_at_15_and_26() {
        let none = Code::new(0).unwrap();
        assert_eq!(classify_band(15.0, SkyCondition::Clear, none), TempBand::Normal);
        assert_eq!(classify_band(26.0, SkyCondition::Clear, none), TempBand::Normal);
        assert_eq!(
            classify_band(14.999, SkyCondition::Clear, none),
            TempBand::Cold(Code::new(1).unwrap())
        );
    }

    #[test]
    fn test_code_serde_round_trip() {
        let code = Code::new(3).unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "3");
        let back: Code = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<Code>("9").is_err());
    }
}
