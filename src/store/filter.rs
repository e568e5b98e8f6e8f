use chrono::NaiveDate;
use duckdb::types::Value;
use serde::Deserialize;
use std::str::FromStr;

/// Filter values exactly as they arrive in a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub location: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parsed filters; every field is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    /// Case-insensitive substring of the location name
    pub location: Option<String>,
    /// Exact (lat, lon) match
    pub coordinates: Option<(f64, f64)>,
    /// Keeps queries starting on or after this date
    pub start_date: Option<NaiveDate>,
    /// Keeps queries ending on or before this date
    pub end_date: Option<NaiveDate>,
}

/// Blank or unparseable input counts as "not given".
pub fn parse_or_absent<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

impl From<&FilterParams> for QueryFilter {
    fn from(params: &FilterParams) -> Self {
        let lat = parse_or_absent::<f64>(params.lat.as_deref());
        let lon = parse_or_absent::<f64>(params.lon.as_deref());

        Self {
            location: parse_or_absent(params.location.as_deref()),
            coordinates: lat.zip(lon),
            start_date: parse_or_absent(params.start_date.as_deref()),
            end_date: parse_or_absent(params.end_date.as_deref()),
        }
    }
}

impl QueryFilter {
    pub fn is_empty(&self) -> bool {
        *self == QueryFilter::default()
    }

    /// WHERE clause (empty when unfiltered) and its positional parameters.
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        if let Some((lat, lon)) = self.coordinates {
            clauses.push("lat = ? AND lon = ?");
            params.push(Value::Double(lat));
            params.push(Value::Double(lon));
        }
        if let Some(location) = &self.location {
            clauses.push("contains(lower(location_name), lower(?))");
            params.push(Value::Text(location.clone()));
        }
        if let Some(start) = self.start_date {
            clauses.push("start_date >= CAST(? AS DATE)");
            params.push(Value::Text(start.to_string()));
        }
        if let Some(end) = self.end_date {
            clauses.push("end_date <= CAST(? AS DATE)");
            params.push(Value::Text(end.to_string()));
        }

        if clauses.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), params)
        }
    }
}
