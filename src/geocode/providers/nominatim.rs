use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::geocode::{join_name_parts, GeocodingProvider, Lookup, ResolvedLocation};
use crate::upstream::{self, UpstreamError};

/// OpenStreetMap's free-text search. No key, but a user agent is mandatory.
pub struct NominatimProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl NominatimProvider {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: upstream::build_client(timeout, user_agent)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        upstream::read_json(upstream::check_status(response)?).await
    }
}

fn display_name(result: &SearchResult) -> String {
    let address = result.address.as_ref();
    let place = address.and_then(|a| {
        [&a.city, &a.town, &a.village, &a.state]
            .into_iter()
            .flatten()
            .find(|p| !p.trim().is_empty())
    });
    let country = address.and_then(|a| a.country.as_deref());

    let name = join_name_parts([place.map(String::as_str), country]);
    if name.is_empty() {
        result.display_name.clone().unwrap_or_default()
    } else {
        name
    }
}

fn parse_coordinate(value: &str) -> Result<f64, UpstreamError> {
    value
        .trim()
        .parse()
        .map_err(|_| UpstreamError::Document(format!("bad coordinate '{}'", value)))
}

#[async_trait]
impl GeocodingProvider for NominatimProvider {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn lookup(&self, query: &str) -> Result<Lookup, UpstreamError> {
        let results = match self.search(query).await {
            Ok(results) => results,
            Err(e) if e.is_timeout() => return Ok(Lookup::TimedOut),
            Err(e) => return Err(e),
        };

        let Some(first) = results.first() else {
            return Ok(Lookup::NotFound);
        };

        Ok(Lookup::Found(ResolvedLocation {
            name: display_name(first),
            lat: parse_coordinate(&first.lat)?,
            lon: parse_coordinate(&first.lon)?,
        }))
    }
}
