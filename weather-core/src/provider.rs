use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{
    Config,
    model::{CurrentWeather, RawSample},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Live upstream weather source.
///
/// Implementations do not retry; any failure is reported once and left to
/// the caller.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, locator: &str) -> anyhow::Result<CurrentWeather>;

    /// Raw fixed-interval samples covering `days` full days. The provider may
    /// return fewer samples than requested.
    async fn fetch_forecast_samples(&self, locator: &str, days: u8) -> anyhow::Result<Vec<RawSample>>;

    /// Cheap reachability check used for readiness.
    async fn ping(&self) -> anyhow::Result<()>;
}

/// Construct the live provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for OpenWeatherMap.\n\
                 Hint: run `weather configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    let provider = match config.base_url.as_deref() {
        Some(base_url) => OpenWeatherProvider::with_base_url(api_key.to_owned(), base_url),
        None => OpenWeatherProvider::new(api_key.to_owned()),
    };

    Ok(Arc::new(provider))
}
