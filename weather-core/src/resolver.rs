//! Query resolution: validation, mock-vs-live dispatch and provenance tagging.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    Config,
    aggregate::aggregate,
    cache::{CacheKey, ResultCache},
    city::{self, SupportedCity},
    error::WeatherError,
    mock::MockProvider,
    model::{CityListing, Payload, ResolvedResponse, Source},
    provider::{WeatherProvider, provider_from_config},
};

pub const MIN_DAYS: u8 = 1;
pub const MAX_DAYS: u8 = 7;
/// Used by callers when no day count is given.
pub const DEFAULT_DAYS: u8 = 3;

pub type PayloadCache = ResultCache<CacheKey, Payload>;

#[derive(Debug)]
pub struct Resolver {
    provider: Option<Arc<dyn WeatherProvider>>,
    force_mock: bool,
    mock: MockProvider,
    cache: Arc<PayloadCache>,
}

impl Resolver {
    /// A resolver without a live provider only ever serves mock data.
    pub fn new(provider: Option<Arc<dyn WeatherProvider>>, force_mock: bool) -> Self {
        Self {
            provider,
            force_mock,
            mock: MockProvider::new(),
            cache: Arc::new(PayloadCache::default()),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = if config.is_api_configured() {
            Some(provider_from_config(config)?)
        } else {
            warn!("OpenWeatherMap API key not configured, using mock data");
            None
        };

        let resolver = Self::new(provider, config.use_mock_data)
            .with_cache(Arc::new(PayloadCache::new(config.cache_policy())));
        info!(source = %resolver.source(), "Resolver ready");
        Ok(resolver)
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<PayloadCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_mock(mut self, mock: MockProvider) -> Self {
        self.mock = mock;
        self
    }

    pub fn cache(&self) -> &PayloadCache {
        &self.cache
    }

    /// The source every resolution will be served from.
    pub fn source(&self) -> Source {
        match (&self.provider, self.force_mock) {
            (Some(_), false) => Source::Live,
            _ => Source::Mock,
        }
    }

    fn live(&self) -> Option<&dyn WeatherProvider> {
        match self.source() {
            Source::Live => self.provider.as_deref(),
            Source::Mock => None,
        }
    }

    pub fn cities(&self) -> CityListing {
        let cities: Vec<String> = city::names().into_iter().map(String::from).collect();
        CityListing {
            count: cities.len(),
            cities,
            api_configured: self.provider.is_some(),
            using_mock_data: self.source() == Source::Mock,
        }
    }

    /// Readiness: always ready on mock data, otherwise the provider must answer.
    pub async fn check_ready(&self) -> Result<(), WeatherError> {
        let Some(provider) = self.live() else {
            return Ok(());
        };

        provider.ping().await.map_err(|err| {
            let message = format!("external API error: {err:#}");
            warn!(error = %message, "External API not ready");
            WeatherError::UpstreamFailure(message)
        })
    }

    pub async fn resolve_current(&self, raw_location: &str) -> Result<ResolvedResponse, WeatherError> {
        let city = validate_location(raw_location)?;
        info!(location = city.canonical_name, "Current weather request");

        let payload = match self.live() {
            None => Payload::Current(self.mock.current_for(city.canonical_name)),
            Some(provider) => {
                self.cache
                    .get_or_compute(CacheKey::current(city.canonical_name), || async {
                        provider.fetch_current(city.upstream_locator).await.map(Payload::Current)
                    })
                    .await
                    .map_err(|err| upstream_failure(city, &err))?
            }
        };

        Ok(self.tag(city, payload))
    }

    pub async fn resolve_forecast(
        &self,
        raw_location: &str,
        raw_days: &str,
    ) -> Result<ResolvedResponse, WeatherError> {
        let city = validate_location(raw_location)?;
        let days = parse_days(raw_days)?;
        info!(location = city.canonical_name, days, "Forecast request");

        let payload = match self.live() {
            None => Payload::Forecast(self.mock.forecast_for(city.canonical_name, usize::from(days))),
            Some(provider) => {
                self.cache
                    .get_or_compute(CacheKey::forecast(city.canonical_name, days), || async {
                        let samples = provider.fetch_forecast_samples(city.upstream_locator, days).await?;
                        Ok::<_, anyhow::Error>(Payload::Forecast(aggregate(&samples, usize::from(days))))
                    })
                    .await
                    .map_err(|err| upstream_failure(city, &err))?
            }
        };

        Ok(self.tag(city, payload))
    }

    fn tag(&self, city: &SupportedCity, payload: Payload) -> ResolvedResponse {
        ResolvedResponse { location: city.canonical_name.to_string(), payload, source: self.source() }
    }
}

fn validate_location(raw_location: &str) -> Result<&'static SupportedCity, WeatherError> {
    if raw_location.is_empty() {
        warn!("Missing location parameter");
        return Err(WeatherError::MissingLocation);
    }

    city::normalize(raw_location).ok_or_else(|| {
        let location = city::title_case(raw_location);
        warn!(%location, "Location not supported");
        WeatherError::UnsupportedLocation {
            location,
            available: city::names().into_iter().map(String::from).collect(),
        }
    })
}

/// Parse a day count, accepting only integers in `MIN_DAYS..=MAX_DAYS`.
pub fn parse_days(raw_days: &str) -> Result<u8, WeatherError> {
    let invalid = |reason: String| {
        warn!(days = raw_days, "Invalid days parameter");
        WeatherError::InvalidDayCount(reason)
    };

    let days: i64 = raw_days
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{raw_days}' is not a whole number")))?;

    u8::try_from(days)
        .ok()
        .filter(|d| (MIN_DAYS..=MAX_DAYS).contains(d))
        .ok_or_else(|| invalid(format!("Days must be between {MIN_DAYS} and {MAX_DAYS}")))
}

fn upstream_failure(city: &SupportedCity, err: &anyhow::Error) -> WeatherError {
    let message = format!("{err:#}");
    error!(location = city.canonical_name, error = %message, "Error fetching weather data");
    WeatherError::UpstreamFailure(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_resolver() -> Resolver {
        Resolver::new(None, false).with_mock(MockProvider::with_seed(3))
    }

    #[test]
    fn parse_days_accepts_closed_range() {
        assert_eq!(parse_days("1"), Ok(1));
        assert_eq!(parse_days(" 7 "), Ok(7));
        for bad in ["0", "8", "-1", "abc", "", "2.5", "99999999999999999999"] {
            assert!(
                matches!(parse_days(bad), Err(WeatherError::InvalidDayCount(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn source_requires_provider_and_no_force_flag() {
        assert_eq!(Resolver::new(None, false).source(), Source::Mock);
        assert_eq!(Resolver::new(None, true).source(), Source::Mock);
    }

    #[test]
    fn from_config_without_key_serves_mock() {
        let resolver = Resolver::from_config(&Config::default()).unwrap();
        assert_eq!(resolver.source(), Source::Mock);
        assert!(!resolver.cities().api_configured);
    }

    #[test]
    fn from_config_forced_mock_keeps_provider_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.use_mock_data = true;

        let resolver = Resolver::from_config(&cfg).unwrap();
        let listing = resolver.cities();
        assert_eq!(resolver.source(), Source::Mock);
        assert!(listing.api_configured);
        assert!(listing.using_mock_data);
    }

    #[test]
    fn from_config_with_key_goes_live() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.cache.max_entries = 7;

        let resolver = Resolver::from_config(&cfg).unwrap();
        assert_eq!(resolver.source(), Source::Live);
        assert_eq!(resolver.cache().policy().max_entries, 7);
    }

    #[tokio::test]
    async fn missing_location_fails_fast() {
        let resolver = mock_resolver();
        assert_eq!(resolver.resolve_current("").await, Err(WeatherError::MissingLocation));
        assert_eq!(resolver.resolve_forecast("", "3").await, Err(WeatherError::MissingLocation));
    }

    #[tokio::test]
    async fn whitespace_is_matched_verbatim() {
        let resolver = mock_resolver();
        for raw in ["new  york", "  london ", "   "] {
            let err = resolver.resolve_current(raw).await.unwrap_err();
            assert!(
                matches!(&err, WeatherError::UnsupportedLocation { location, .. } if location == &city::title_case(raw)),
                "{raw:?} should be unsupported, got {err:?}"
            );
            assert_eq!(err.status_code(), 404);
        }
    }

    #[tokio::test]
    async fn unsupported_location_lists_every_city() {
        let err = mock_resolver().resolve_current("Atlantis").await.unwrap_err();

        assert_eq!(err.status_code(), 404);
        assert_eq!(err.available_locations().map(<[String]>::len), Some(city::all().len()));
    }

    #[tokio::test]
    async fn location_is_checked_before_days() {
        let err = mock_resolver().resolve_forecast("Atlantis", "0").await.unwrap_err();
        assert!(matches!(err, WeatherError::UnsupportedLocation { .. }));
    }

    #[tokio::test]
    async fn mock_current_for_new_york() {
        let response = mock_resolver().resolve_current("new york").await.unwrap();

        assert_eq!(response.location, "New York");
        assert_eq!(response.source, Source::Mock);
        let current = response.payload.as_current().unwrap();
        assert_eq!(current.temperature, 72.0);
        assert_eq!(current.condition, "Partly Cloudy");
        assert_eq!(current.humidity, 65);
        assert_eq!(current.wind_speed, 8.0);
    }

    #[tokio::test]
    async fn mock_paths_never_touch_the_cache() {
        let resolver = mock_resolver();
        resolver.resolve_current("London").await.unwrap();
        resolver.resolve_forecast("London", "2").await.unwrap();
        assert!(resolver.cache().is_empty().await);
    }
}
