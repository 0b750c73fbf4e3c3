use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
    aggregate::round1,
    model::{CurrentWeather, RawSample},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// The forecast endpoint samples every 3 hours.
pub const SAMPLES_PER_DAY: u32 = 8;

const DATA_TIMEOUT: Duration = Duration::from_secs(10);
const PING_TIMEOUT: Duration = Duration::from_secs(3);
const PING_LOCATOR: &str = "London,GB";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str()), ("units", "imperial")])
            .timeout(DATA_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeatherMap ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeatherMap {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeatherMap {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeatherMap {what} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    humidity: Option<u8>,
    #[serde(default)]
    pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    /// Shift in seconds from UTC.
    #[serde(default)]
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    city: Option<OwCity>,
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, locator: &str) -> Result<CurrentWeather> {
        info!(locator, "Fetching current weather from OpenWeatherMap");

        let parsed: OwCurrentResponse =
            self.get_json("weather", &[("q", locator)], "current weather").await?;

        let weather = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeatherMap current response contained no conditions"))?;
        let humidity = parsed
            .main
            .humidity
            .ok_or_else(|| anyhow!("OpenWeatherMap current response is missing humidity"))?;

        Ok(CurrentWeather {
            temperature: round1(parsed.main.temp),
            condition: weather.main,
            description: weather.description,
            humidity,
            wind_speed: round1(parsed.wind.speed),
            pressure: parsed.main.pressure,
            feels_like: parsed.main.feels_like.map(round1),
        })
    }

    async fn fetch_forecast_samples(&self, locator: &str, days: u8) -> Result<Vec<RawSample>> {
        info!(locator, days, "Fetching forecast samples from OpenWeatherMap");

        let count = (u32::from(days) * SAMPLES_PER_DAY).to_string();
        let parsed: OwForecastResponse = self
            .get_json("forecast", &[("q", locator), ("cnt", count.as_str())], "forecast")
            .await?;

        let shift = parsed.city.and_then(|c| c.timezone).unwrap_or(0);
        let offset = FixedOffset::east_opt(shift)
            .ok_or_else(|| anyhow!("OpenWeatherMap returned an invalid timezone shift: {shift}"))?;

        let samples = parsed
            .list
            .into_iter()
            .map(|entry| {
                let timestamp = unix_to_local(entry.dt, offset)
                    .ok_or_else(|| anyhow!("OpenWeatherMap returned an invalid timestamp: {}", entry.dt))?;
                let condition = entry
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| w.main)
                    .unwrap_or_else(|| "Unknown".to_string());

                Ok(RawSample { timestamp, temperature: entry.main.temp, condition })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(locator, requested = %count, received = samples.len(), "Forecast samples received");
        Ok(samples)
    }

    async fn ping(&self) -> Result<()> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", PING_LOCATOR), ("appid", self.api_key.as_str())])
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .context("Failed to reach OpenWeatherMap")?;

        let status = res.status();
        if status != reqwest::StatusCode::OK {
            return Err(anyhow!("OpenWeatherMap readiness check failed with status {status}"));
        }

        Ok(())
    }
}

fn unix_to_local(ts: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|utc| utc.with_timezone(&offset))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
