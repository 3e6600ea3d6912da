//! Open-Meteo weather source.
//!
//! Two blocking calls per fetch: the geocoding API resolves the location
//! query to coordinates, the forecast API returns current conditions.
//! Both endpoints are keyless. Calls carry a request timeout; a timeout is
//! reported like any other fetch failure and the workflow falls back to
//! manual entry.

use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use serde::Deserialize;
use tracing::debug;

use super::{WeatherReport, WeatherSource};
use crate::error::SourceError;
use crate::state::{SkyCondition, TimeOfDay};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking Open-Meteo client.
pub struct OpenMeteoSource {
    client: reqwest::blocking::Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoSource {
    /// Creates a client against the public Open-Meteo endpoints.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_endpoints(GEOCODING_URL, FORECAST_URL)
    }

    /// Creates a client against custom endpoints (used by tests).
    pub fn with_endpoints(
        geocoding_url: impl Into<String>,
        forecast_url: impl Into<String>,
    ) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::RequestFailed {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            geocoding_url: geocoding_url.into(),
            forecast_url: forecast_url.into(),
        })
    }

    fn geocode(&self, location: &str) -> Result<(f64, f64), SourceError> {
        let response: GeocodingResponse = self
            .client
            .get(&self.geocoding_url)
            .query(&[("name", location), ("count", "1")])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| SourceError::RequestFailed {
                message: e.to_string(),
            })?
            .json()
            .map_err(|e| SourceError::MalformedPayload {
                message: e.to_string(),
            })?;

        let hit = response
            .results
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| SourceError::LocationNotFound {
                query: location.to_string(),
            })?;
        Ok((hit.latitude, hit.longitude))
    }

    fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions, SourceError> {
        let response: ForecastResponse = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                (
                    "current",
                    "temperature_2m,wind_speed_10m,weather_code".to_string(),
                ),
                ("wind_speed_unit", "kmh".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| SourceError::RequestFailed {
                message: e.to_string(),
            })?
            .json()
            .map_err(|e| SourceError::MalformedPayload {
                message: e.to_string(),
            })?;

        response.current.ok_or_else(|| SourceError::MalformedPayload {
            message: "response has no current block".to_string(),
        })
    }
}

impl WeatherSource for OpenMeteoSource {
    fn fetch(&self, location: &str) -> Result<WeatherReport, SourceError> {
        let (latitude, longitude) = self.geocode(location)?;
        debug!(location, latitude, longitude, "location resolved");

        let current = self.current(latitude, longitude)?;
        let report = WeatherReport {
            time_of_day: time_of_day_from_local(&current.time)?,
            sky: sky_from_wmo_code(current.weather_code),
            temperature_c: current.temperature_2m,
            wind_kmh: current.wind_speed_10m,
        };
        debug!(?report, "weather fetched");
        Ok(report)
    }
}

/// Late afternoon onward and the small hours count as evening.
fn time_of_day_from_local(timestamp: &str) -> Result<TimeOfDay, SourceError> {
    let parsed = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M").map_err(|e| {
        SourceError::MalformedPayload {
            message: format!("timestamp {timestamp:?}: {e}"),
        }
    })?;
    let hour = parsed.hour();
    if hour > 14 || hour < 3 {
        Ok(TimeOfDay::Evening)
    } else {
        Ok(TimeOfDay::Morning)
    }
}

/// WMO weather interpretation codes to the three-way sky condition.
///
/// 0-1 clear, overcast/fog cloudy, everything else is some form of
/// precipitation.
fn sky_from_wmo_code(code: u32) -> SkyCondition {
    match code {
        0 | 1 => SkyCondition::Clear,
        2 | 3 | 45 | 48 => SkyCondition::Cloudy,
        _ => SkyCondition::Precipitation,
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingHit>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingHit {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    time: String,
    temperature_2m: f64,
    wind_speed_10m: f64,
    weather_code: u32,
}
