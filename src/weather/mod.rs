pub mod models;

use chrono::NaiveDate;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::WeatherConfig;
use crate::upstream::{self, UpstreamError};
use models::{ForecastDay, OwmCondition, OwmCurrent, OwmForecast, OwmForecastEntry, WeatherSnapshot};

/// Time-of-day label of the one forecast slot kept per day.
pub const FORECAST_HOUR_MARKER: &str = "12:00:00";

/// Current conditions and the 5-day/3-hour forecast from OpenWeatherMap.
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, UpstreamError> {
        let client = upstream::build_client(
            Duration::from_secs(config.timeout_secs),
            concat!("weather-ledger/", env!("CARGO_PKG_VERSION")),
        )?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str, lat: f64, lon: f64) -> Result<T, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/data/2.5/{}", self.base_url, endpoint))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        upstream::read_json(upstream::check_status(response)?).await
    }

    pub async fn current_weather(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, UpstreamError> {
        let current: OwmCurrent = self.get("weather", lat, lon).await?;
        let (description, icon) = condition(current.weather.first());

        Ok(WeatherSnapshot {
            temp: whole_degrees(current.main.temp),
            feels_like: whole_degrees(current.main.feels_like),
            humidity: current.main.humidity,
            wind_speed: current.wind.speed,
            description,
            icon,
        })
    }

    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<Vec<ForecastDay>, UpstreamError> {
        let forecast: OwmForecast = self.get("forecast", lat, lon).await?;
        debug!("Forecast for {},{} has {} entries", lat, lon, forecast.list.len());
        Ok(daily_forecast(&forecast.list))
    }
}

/// Keeps the noon entry of each calendar day, first one wins.
/// Days without a noon entry are left out.
pub fn daily_forecast(entries: &[OwmForecastEntry]) -> Vec<ForecastDay> {
    let mut seen: HashSet<NaiveDate> = HashSet::new();
    let mut days = Vec::new();

    for entry in entries.iter().filter(|e| e.dt_txt.contains(FORECAST_HOUR_MARKER)) {
        let date_part = entry.dt_txt.split(' ').next().unwrap_or_default();
        let date = match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                warn!("Skipping forecast entry with bad dt_txt '{}': {}", entry.dt_txt, e);
                continue;
            }
        };

        if !seen.insert(date) {
            continue;
        }

        let (description, icon) = condition(entry.weather.first());
        days.push(ForecastDay {
            date,
            temp: whole_degrees(entry.main.temp),
            description,
            icon,
        });
    }

    days
}

/// Nearest whole degree; ties go to the even neighbour (2.5 -> 2, 3.5 -> 4).
pub fn whole_degrees(value: f64) -> i64 {
    value.round_ties_even() as i64
}

fn condition(first: Option<&OwmCondition>) -> (String, String) {
    first
        .map(|c| (title_case(&c.description), c.icon.clone()))
        .unwrap_or_default()
}

/// Upper-cases every letter that follows a non-letter, lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}
