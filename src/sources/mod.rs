//! External collaborator contracts.
//!
//! The core only knows these traits; the concrete weather client, console
//! prompt, and recommendation catalog live behind them. Failures are
//! ordinary values ([`crate::error::SourceError`]) that the workflow turns
//! into state transitions.

mod console;
mod knowledge;
#[cfg(feature = "client")]
mod openmeteo;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::state::{ActivityKind, Place, SkyCondition, TempBand, TimeOfDay};

pub use console::ConsolePrompt;
pub use knowledge::CatalogKnowledgeBase;
#[cfg(feature = "client")]
pub use openmeteo::OpenMeteoSource;

/// Current weather for a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Morning or evening at the observation time.
    pub time_of_day: TimeOfDay,
    /// Observed sky condition.
    pub sky: SkyCondition,
    /// Temperature in Celsius.
    pub temperature_c: f64,
    /// Wind speed in km/h.
    pub wind_kmh: f64,
}

/// Fetches current weather for a free-form location query.
pub trait WeatherSource {
    /// Resolves the location and returns its current weather.
    ///
    /// # Errors
    ///
    /// Location-not-found, transport failures, and malformed payloads are
    /// all reported as [`SourceError`] values so the workflow can fall
    /// back to manual entry.
    fn fetch(&self, location: &str) -> Result<WeatherReport, SourceError>;
}

/// Blocking user interaction.
///
/// `ask` re-prompts until the answer is one of the accepted options, so
/// callers can parse the returned string infallibly.
pub trait UserPrompt {
    /// Asks a closed question; the answer is one of `options`.
    fn ask(&mut self, question: &str, options: &[&str]) -> Result<String, SourceError>;

    /// Asks a free-form question (used for the location query).
    fn ask_text(&mut self, question: &str) -> Result<String, SourceError>;

    /// Asks for a number, re-prompting until one parses.
    fn ask_number(&mut self, question: &str) -> Result<f64, SourceError>;

    /// Shows a message to the user.
    fn inform(&mut self, message: &str);
}

/// A recommendation looked up from the knowledge catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The main suggested activity.
    pub primary: String,
    /// A secondary suggestion.
    pub secondary: String,
    /// An activity to avoid under these conditions.
    pub alternative: String,
    /// The accessory to bring along.
    pub accessory: String,
}

/// Composite lookup key for the recommendation catalog.
///
/// Rendered as `activity_<kind>_<place>_<timeofday>_<band>_<sky>`, all
/// lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeKey {
    /// Preferred activity category.
    pub kind: ActivityKind,
    /// Indoor or outdoor placement.
    pub place: Place,
    /// Morning or evening.
    pub time: TimeOfDay,
    /// Temperature band (only its label participates in the key).
    pub band: TempBand,
    /// Sky condition.
    pub sky: SkyCondition,
}

impl CompositeKey {
    /// The rendered catalog key.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "activity_{}_{}_{}_{}_{}",
            self.kind.label(),
            self.place.label(),
            self.time.label(),
            self.band.label(),
            self.sky.label()
        )
    }

    /// The ordered keys to try when a lookup misses.
    ///
    /// Outdoor activities under precipitation fall back to an indoor,
    /// cloudy variant; an indoor key under precipitation retries as
    /// cloudy; as a last resort the cold/hot band retries as normal.
    /// Callers that exhaust the chain report "no recommendation
    /// available" instead of failing.
    #[must_use]
    pub fn fallback_chain(&self) -> Vec<CompositeKey> {
        let mut chain = vec![*self];
        let mut current = *self;

        if current.sky == SkyCondition::Precipitation {
            if current.place == Place::Outdoor {
                current.place = Place::Indoor;
            }
            current.sky = SkyCondition::Cloudy;
            chain.push(current);
        }
        if current.band != TempBand::Normal {
            current.band = TempBand::Normal;
            chain.push(current);
        }

        chain.dedup_by_key(|key| key.render());
        chain
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Looks up activity recommendations by composite key.
pub trait KnowledgeBase {
    /// Returns the recommendation for the key, or `None` when the catalog
    /// has no entry (a miss, not an error).
    fn lookup(&self, key: &CompositeKey) -> Result<Option<Recommendation>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Code;

    fn key(place: Place, sky: SkyCondition, band: TempBand) -> CompositeKey {
        CompositeKey {
            kind: ActivityKind::Sport,
            place,
            time: TimeOfDay::Morning,
            band,
            sky,
        }
    }

    #[test]
    fn test_key_rendering() {
        let key = key(
            Place::Outdoor,
            SkyCondition::Clear,
            TempBand::Cold(Code::new(2).unwrap()),
        );
        assert_eq!(key.render(), "activity_sport_outdoor_morning_cold_clear");
    }

    #[test]
    fn test_outdoor_precipitation_chain() {
        let cold = TempBand::Cold(Code::new(3).unwrap());
        let chain = key(Place::Outdoor, SkyCondition::Precipitation, cold).fallback_chain();
        let rendered: Vec<String> = chain.iter().map(CompositeKey::render).collect();
        assert_eq!(
            rendered,
            vec![
                "activity_sport_outdoor_morning_cold_precipitation",
                "activity_sport_indoor_morning_cold_cloudy",
                "activity_sport_indoor_morning_normal_cloudy",
            ]
        );
    }

    #[test]
    fn test_normal_band_chain_is_shorter() {
        let chain =
            key(Place::Outdoor, SkyCondition::Precipitation, TempBand::Normal).fallback_chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].render(), "activity_sport_indoor_morning_normal_cloudy");
    }

    #[test]
    fn test_clear_sky_only_retries_band() {
        let hot = TempBand::Hot(Code::new(1).unwrap());
        let chain = key(Place::Indoor, SkyCondition::Clear, hot).fallback_chain();
        let rendered: Vec<String> = chain.iter().map(CompositeKey::render).collect();
        assert_eq!(
            rendered,
            vec![
                "activity_sport_indoor_morning_hot_clear",
                "activity_sport_indoor_morning_normal_clear",
            ]
        );
    }

    #[test]
    fn test_no_fallback_needed() {
        let chain = key(Place::Indoor, SkyCondition::Cloudy, TempBand::Normal).fallback_chain();
        assert_eq!(chain.len(), 1);
    }
}
