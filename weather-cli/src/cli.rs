use anyhow::Context;
use clap::{Parser, Subcommand};
use weather_core::{Config, DEFAULT_DAYS, Resolver, WeatherError};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Print JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Serve mock data even if an API key is configured.
    #[arg(long, global = true)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and mock-data preference.
    Configure,

    /// Show current weather for a supported city.
    Current {
        /// City name, e.g. "new york".
        location: String,
    },

    /// Show a daily forecast for a supported city.
    Forecast {
        /// City name, e.g. "london".
        location: String,

        /// Number of days, 1 to 7.
        #[arg(long, default_value_t = DEFAULT_DAYS.to_string())]
        days: String,
    },

    /// List supported cities.
    Cities,

    /// Check whether the configured weather source is reachable.
    Ready,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli { json, mock, command } = self;

        if let Command::Configure = command {
            return configure();
        }

        let mut config = Config::load_with_env()?;
        if mock {
            config.use_mock_data = true;
        }
        let resolver = Resolver::from_config(&config)?;

        match command {
            Command::Configure => Ok(()),
            Command::Current { location } => {
                let result = resolver.resolve_current(&location).await;
                report(result.map(|r| output::render_response(&r, json)), json)
            }
            Command::Forecast { location, days } => {
                let result = resolver.resolve_forecast(&location, &days).await;
                report(result.map(|r| output::render_response(&r, json)), json)
            }
            Command::Cities => {
                println!("{}", output::render_cities(&resolver.cities(), json));
                Ok(())
            }
            Command::Ready => {
                let result = resolver.check_ready().await;
                println!("{}", output::render_ready(result.as_ref().err(), json));
                result.map_err(anyhow::Error::from)
            }
        }
    }
}

fn report(rendered: Result<String, WeatherError>, json: bool) -> anyhow::Result<()> {
    match rendered {
        Ok(text) => {
            println!("{text}");
            Ok(())
        }
        Err(err) => {
            if json {
                println!("{}", output::render_error(&err));
            }
            Err(output::describe_error(err))
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeatherMap API key (leave empty to keep mock data):")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    config.use_mock_data = inquire::Confirm::new("Always serve mock data?")
        .with_default(config.use_mock_data)
        .prompt()
        .context("Failed to read mock-data preference")?;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}
