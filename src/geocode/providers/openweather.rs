use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::geocode::{join_name_parts, GeocodingProvider, Lookup, ResolvedLocation};
use crate::upstream::{self, UpstreamError};

/// OpenWeatherMap direct geocoding. Needs the same API key as the weather calls.
pub struct OpenWeatherGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    name: Option<String>,
    state: Option<String>,
    country: Option<String>,
    lat: f64,
    lon: f64,
}

impl OpenWeatherGeocoder {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: upstream::build_client(timeout, concat!("weather-ledger/", env!("CARGO_PKG_VERSION")))?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl GeocodingProvider for OpenWeatherGeocoder {
    fn name(&self) -> &'static str {
        "openweathermap"
    }

    // Last resort: timeouts here are ordinary errors.
    async fn lookup(&self, query: &str) -> Result<Lookup, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/geo/1.0/direct", self.base_url))
            .query(&[("q", query), ("limit", "1"), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let candidates: Vec<Candidate> = upstream::read_json(upstream::check_status(response)?).await?;

        let Some(first) = candidates.into_iter().next() else {
            return Ok(Lookup::NotFound);
        };

        let name = join_name_parts([
            first.name.as_deref(),
            first.state.as_deref(),
            first.country.as_deref(),
        ]);

        Ok(Lookup::Found(ResolvedLocation {
            name,
            lat: first.lat,
            lon: first.lon,
        }))
    }
}
