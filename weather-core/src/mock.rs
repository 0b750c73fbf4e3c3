//! Deterministic fixtures plus randomized synthesis for cities without one.
//!
//! Used whenever the engine runs without a live provider credential or when
//! mock data is forced through configuration.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use tracing::debug;

use crate::model::{CurrentWeather, DailySummary};

pub const MOCK_CONDITIONS: [&str; 4] = ["Sunny", "Cloudy", "Rainy", "Partly Cloudy"];

const MOCK_WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

struct Fixture {
    city: &'static str,
    temperature: f64,
    condition: &'static str,
    humidity: u8,
    wind_speed: f64,
    forecast: &'static [(&'static str, f64, f64, &'static str)],
}

static FIXTURES: &[Fixture] = &[
    Fixture {
        city: "New York",
        temperature: 72.0,
        condition: "Partly Cloudy",
        humidity: 65,
        wind_speed: 8.0,
        forecast: &[
            ("Monday", 75.0, 62.0, "Sunny"),
            ("Tuesday", 73.0, 60.0, "Cloudy"),
            ("Wednesday", 70.0, 58.0, "Rainy"),
        ],
    },
    Fixture {
        city: "London",
        temperature: 59.0,
        condition: "Rainy",
        humidity: 78,
        wind_speed: 12.0,
        forecast: &[
            ("Monday", 62.0, 52.0, "Rainy"),
            ("Tuesday", 61.0, 51.0, "Cloudy"),
            ("Wednesday", 63.0, 53.0, "Partly Cloudy"),
        ],
    },
    Fixture {
        city: "Tokyo",
        temperature: 68.0,
        condition: "Clear",
        humidity: 60,
        wind_speed: 6.0,
        forecast: &[
            ("Monday", 71.0, 58.0, "Clear"),
            ("Tuesday", 72.0, 59.0, "Sunny"),
            ("Wednesday", 70.0, 57.0, "Partly Cloudy"),
        ],
    },
    Fixture {
        city: "Sydney",
        temperature: 77.0,
        condition: "Sunny",
        humidity: 55,
        wind_speed: 10.0,
        forecast: &[
            ("Monday", 80.0, 65.0, "Sunny"),
            ("Tuesday", 78.0, 64.0, "Partly Cloudy"),
            ("Wednesday", 76.0, 63.0, "Cloudy"),
        ],
    },
    Fixture {
        city: "Paris",
        temperature: 64.0,
        condition: "Cloudy",
        humidity: 70,
        wind_speed: 9.0,
        forecast: &[
            ("Monday", 67.0, 54.0, "Cloudy"),
            ("Tuesday", 65.0, 53.0, "Partly Cloudy"),
            ("Wednesday", 68.0, 55.0, "Sunny"),
        ],
    },
];

fn fixture(city: &str) -> Option<&'static Fixture> {
    FIXTURES.iter().find(|f| f.city == city)
}

pub fn has_fixture(city: &str) -> bool {
    fixture(city).is_some()
}

pub struct MockProvider {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider").finish_non_exhaustive()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible synthesis, mainly for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self { rng: Mutex::new(Box::new(rng)) }
    }

    pub fn current_for(&self, city: &str) -> CurrentWeather {
        if let Some(fx) = fixture(city) {
            return CurrentWeather {
                temperature: fx.temperature,
                condition: fx.condition.to_string(),
                description: None,
                humidity: fx.humidity,
                wind_speed: fx.wind_speed,
                pressure: None,
                feels_like: None,
            };
        }

        debug!(city, "No fixture, synthesizing current weather");
        let mut rng = self.rng.lock();
        CurrentWeather {
            temperature: f64::from(rng.gen_range(50..=85_i32)),
            condition: pick_condition(&mut **rng),
            description: None,
            humidity: rng.gen_range(40..=90_u8),
            wind_speed: f64::from(rng.gen_range(5..=20_i32)),
            pressure: None,
            feels_like: None,
        }
    }

    /// Fixture forecasts are truncated, never padded, so the result may be
    /// shorter than `days`.
    pub fn forecast_for(&self, city: &str, days: usize) -> Vec<DailySummary> {
        if let Some(fx) = fixture(city) {
            return fx
                .forecast
                .iter()
                .take(days)
                .map(|&(day, high, low, condition)| DailySummary {
                    day: day.to_string(),
                    high,
                    low,
                    condition: condition.to_string(),
                })
                .collect();
        }

        debug!(city, days, "No fixture, synthesizing forecast");
        let mut rng = self.rng.lock();
        (0..days)
            .map(|i| DailySummary {
                day: MOCK_WEEKDAYS[i % MOCK_WEEKDAYS.len()].to_string(),
                high: f64::from(rng.gen_range(70..=90_i32)),
                low: f64::from(rng.gen_range(50..=65_i32)),
                condition: pick_condition(&mut **rng),
            })
            .collect()
    }
}

fn pick_condition(rng: &mut dyn RngCore) -> String {
    MOCK_CONDITIONS
        .choose(rng)
        .copied()
        .unwrap_or(MOCK_CONDITIONS[0])
        .to_string()
}
