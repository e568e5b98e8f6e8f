use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A saved (location, date range) query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub id: i64,
    pub location_name: String,
    pub lat: f64,
    pub lon: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// The user-editable fields, used for both create and full-overwrite update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewWeatherQuery {
    pub location_name: String,
    pub lat: f64,
    pub lon: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
