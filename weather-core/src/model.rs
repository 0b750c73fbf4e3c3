use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Current conditions in imperial units (°F, mph).
///
/// `description`, `pressure` and `feels_like` are only filled in by the live provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub humidity: u8,
    pub wind_speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub day: String,
    pub high: f64,
    pub low: f64,
    pub condition: String,
}

/// One fixed-interval upstream forecast sample, in the city's local time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: f64,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Current(CurrentWeather),
    Forecast(Vec<DailySummary>),
}

impl Payload {
    pub fn as_current(&self) -> Option<&CurrentWeather> {
        match self {
            Payload::Current(current) => Some(current),
            Payload::Forecast(_) => None,
        }
    }

    pub fn as_forecast(&self) -> Option<&[DailySummary]> {
        match self {
            Payload::Forecast(days) => Some(days),
            Payload::Current(_) => None,
        }
    }
}

/// Provenance tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Mock,
    Live,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Mock => "mock",
            Source::Live => "live",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedResponse {
    pub location: String,
    #[serde(flatten)]
    pub payload: Payload,
    pub source: Source,
}

/// Snapshot of the supported set and the mode the engine runs in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityListing {
    pub cities: Vec<String>,
    pub count: usize,
    pub api_configured: bool,
    pub using_mock_data: bool,
}
