//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - The supported city registry and query validation
//! - Mock-vs-live source selection and provenance tagging
//! - The OpenWeatherMap client and daily aggregation of its 3-hourly samples
//! - A bounded result cache for live lookups
//!
//! It is used by `weather-cli`, but can also sit behind an HTTP service.

pub mod aggregate;
pub mod cache;
pub mod city;
pub mod config;
pub mod error;
pub mod mock;
pub mod model;
pub mod provider;
pub mod resolver;

pub use cache::{CacheKey, CachePolicy, ResultCache};
pub use city::SupportedCity;
pub use config::{CacheConfig, Config};
pub use error::WeatherError;
pub use mock::MockProvider;
pub use model::{CityListing, CurrentWeather, DailySummary, Payload, RawSample, ResolvedResponse, Source};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use resolver::{DEFAULT_DAYS, MAX_DAYS, MIN_DAYS, Resolver};
