use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Upstream documents (OpenWeatherMap 2.5, units=metric)

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Deserialize)]
pub struct OwmCondition {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwmWind {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct OwmCurrent {
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
    #[serde(default)]
    pub wind: OwmWind,
}

#[derive(Debug, Deserialize)]
pub struct OwmForecastEntry {
    pub dt_txt: String,
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
pub struct OwmForecast {
    pub list: Vec<OwmForecastEntry>,
}

// What the pages and the JSON API get

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub temp: i64,
    pub feels_like: i64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temp: i64,
    pub description: String,
    pub icon: String,
}
