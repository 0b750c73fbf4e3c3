//! Text and JSON rendering for resolver results.

use chrono::Utc;
use serde_json::{Value, json};
use weather_core::{CityListing, CurrentWeather, DailySummary, Payload, ResolvedResponse, WeatherError};

pub fn render_response(response: &ResolvedResponse, as_json: bool) -> String {
    if as_json {
        return pretty(response_json(response));
    }

    match &response.payload {
        Payload::Current(current) => current_text(&response.location, current, response.source.as_str()),
        Payload::Forecast(days) => forecast_text(&response.location, days, response.source.as_str()),
    }
}

fn response_json(response: &ResolvedResponse) -> Value {
    let mut body = json!({
        "location": response.location,
        "timestamp": Utc::now().to_rfc3339(),
        "source": response.source,
    });

    match &response.payload {
        Payload::Current(current) => body["current"] = json!(current),
        Payload::Forecast(days) => {
            body["forecast"] = json!(days);
            body["days"] = json!(days.len());
        }
    }
    body
}

fn current_text(location: &str, current: &CurrentWeather, source: &str) -> String {
    let mut lines = vec![
        format!("{location} ({source})"),
        format!("  Condition:   {}", current.condition),
    ];
    if let Some(description) = &current.description {
        lines.push(format!("  Description: {description}"));
    }
    lines.push(format!("  Temperature: {:.1} °F", current.temperature));
    if let Some(feels_like) = current.feels_like {
        lines.push(format!("  Feels like:  {feels_like:.1} °F"));
    }
    lines.push(format!("  Humidity:    {}%", current.humidity));
    lines.push(format!("  Wind:        {:.1} mph", current.wind_speed));
    if let Some(pressure) = current.pressure {
        lines.push(format!("  Pressure:    {pressure} hPa"));
    }
    lines.join("\n")
}

fn forecast_text(location: &str, days: &[DailySummary], source: &str) -> String {
    let mut lines = vec![format!("{location}: {}-day forecast ({source})", days.len())];
    lines.extend(days.iter().map(|d| {
        format!("  {:<10} high {:>5.1} °F  low {:>5.1} °F  {}", d.day, d.high, d.low, d.condition)
    }));
    lines.join("\n")
}

pub fn render_cities(listing: &CityListing, as_json: bool) -> String {
    if as_json {
        return pretty(json!(listing));
    }

    let mode = if listing.using_mock_data { "mock data" } else { "OpenWeatherMap" };
    let mut lines = vec![format!("{} supported cities (serving {mode}):", listing.count)];
    lines.extend(listing.cities.iter().map(|c| format!("  {c}")));
    lines.join("\n")
}

pub fn render_ready(failure: Option<&WeatherError>, as_json: bool) -> String {
    let (status, message) = match failure {
        None => ("ready", "ready".to_string()),
        Some(err) => ("not ready", err.to_string()),
    };

    if as_json {
        return pretty(json!({
            "status": status,
            "message": message,
            "timestamp": Utc::now().to_rfc3339(),
        }));
    }
    format!("{status}: {message}")
}

pub fn render_error(err: &WeatherError) -> String {
    let mut body = json!({
        "error": err.to_string(),
        "status": err.status_code(),
    });
    if let Some(available) = err.available_locations() {
        body["available_locations"] = json!(available);
    }
    pretty(body)
}

/// Turn a resolver error into the message shown on stderr.
pub fn describe_error(err: WeatherError) -> anyhow::Error {
    match err.available_locations() {
        Some(available) => anyhow::anyhow!("{err}.\nAvailable locations: {}", available.join(", ")),
        None => anyhow::Error::from(err),
    }
}

fn pretty(value: Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}
