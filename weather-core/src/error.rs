//! Error taxonomy surfaced by the resolver.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("Missing required parameter: location")]
    MissingLocation,

    #[error("Location not supported: {location}")]
    UnsupportedLocation {
        location: String,
        available: Vec<String>,
    },

    #[error("Invalid days parameter: {0}")]
    InvalidDayCount(String),

    /// Network, timeout, non-success status or malformed payload from the
    /// live provider. The cause only survives as the message.
    #[error("Failed to fetch weather data: {0}")]
    UpstreamFailure(String),
}

impl WeatherError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingLocation | Self::InvalidDayCount(_) => 400,
            Self::UnsupportedLocation { .. } => 404,
            Self::UpstreamFailure(_) => 500,
        }
    }

    /// Supported city names, only carried by `UnsupportedLocation`.
    pub fn available_locations(&self) -> Option<&[String]> {
        match self {
            Self::UnsupportedLocation { available, .. } => Some(available),
            _ => None,
        }
    }
}
