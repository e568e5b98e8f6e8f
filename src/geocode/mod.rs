pub mod providers;

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::upstream::UpstreamError;

/// Canonical name and coordinates for a free-text place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Outcome of one provider lookup. Hard failures travel as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(ResolvedLocation),
    NotFound,
    TimedOut,
}

#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, query: &str) -> Result<Lookup, UpstreamError>;
}

/// Tries each provider in order until one finds the place.
pub struct LocationResolver {
    providers: Vec<Box<dyn GeocodingProvider>>,
}

impl LocationResolver {
    pub fn new(providers: Vec<Box<dyn GeocodingProvider>>) -> Self {
        Self { providers }
    }

    /// Nominatim first, then the credentialed OpenWeatherMap geocoder.
    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        let timeout = Duration::from_secs(config.weather.timeout_secs);

        let primary = providers::nominatim::NominatimProvider::new(
            &config.geocoding.nominatim_url,
            &config.geocoding.user_agent,
            timeout,
        )?;
        let fallback = providers::openweather::OpenWeatherGeocoder::new(
            &config.weather.api_base_url,
            &config.weather.api_key,
            timeout,
        )?;

        Ok(Self::new(vec![Box::new(primary), Box::new(fallback)]))
    }

    /// Returns `Ok(None)` when no provider knows the place.
    pub async fn resolve(&self, query: &str) -> Result<Option<ResolvedLocation>, UpstreamError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        for provider in &self.providers {
            match provider.lookup(query).await? {
                Lookup::Found(location) => {
                    info!("Resolved '{}' via {} to {}", query, provider.name(), location.name);
                    return Ok(Some(location));
                }
                Lookup::TimedOut => {
                    warn!("Geocoder {} timed out for '{}', trying next", provider.name(), query);
                }
                Lookup::NotFound => {
                    debug!("Geocoder {} found nothing for '{}'", provider.name(), query);
                }
            }
        }

        Ok(None)
    }
}

/// Joins the non-empty parts with ", ".
pub fn join_name_parts<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        outcome: fn() -> Result<Lookup, UpstreamError>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GeocodingProvider for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn lookup(&self, _query: &str) -> Result<Lookup, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn scripted(outcome: fn() -> Result<Lookup, UpstreamError>) -> (Box<dyn GeocodingProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Box::new(Scripted { outcome, calls: calls.clone() }), calls)
    }

    fn paris() -> Result<Lookup, UpstreamError> {
        Ok(Lookup::Found(ResolvedLocation {
            name: "Paris, France".to_string(),
            lat: 48.8566,
            lon: 2.3522,
        }))
    }

    #[tokio::test]
    async fn found_stops_the_walk() {
        let (first, first_calls) = scripted(paris);
        let (second, second_calls) = scripted(|| Ok(Lookup::NotFound));
        let resolver = LocationResolver::new(vec![first, second]);

        let location = resolver.resolve("paris").await.unwrap().unwrap();

        assert_eq!(location.name, "Paris, France");
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn timeout_and_not_found_fall_through() {
        let (first, _) = scripted(|| Ok(Lookup::TimedOut));
        let (second, _) = scripted(|| Ok(Lookup::NotFound));
        let (third, third_calls) = scripted(paris);
        let resolver = LocationResolver::new(vec![first, second, third]);

        assert!(resolver.resolve("paris").await.unwrap().is_some());
        assert_eq!(third_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn hard_errors_propagate_immediately() {
        let (first, _) = scripted(|| Err(UpstreamError::Document("garbage".to_string())));
        let (second, second_calls) = scripted(paris);
        let resolver = LocationResolver::new(vec![first, second]);

        assert!(resolver.resolve("paris").await.is_err());
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausted_list_is_not_found() {
        let (first, _) = scripted(|| Ok(Lookup::TimedOut));
        let resolver = LocationResolver::new(vec![first]);

        assert_eq!(resolver.resolve("nowhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn blank_query_skips_providers() {
        let (first, calls) = scripted(paris);
        let resolver = LocationResolver::new(vec![first]);

        assert_eq!(resolver.resolve("   ").await.unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn name_parts_skip_empty_values() {
        let name = join_name_parts([Some("Springfield"), None, Some(""), Some("United States")]);
        assert_eq!(name, "Springfield, United States");
    }

    mod against_mock_servers {
        use super::super::*;
        use crate::geocode::providers::nominatim::NominatimProvider;
        use crate::geocode::providers::openweather::OpenWeatherGeocoder;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn resolver(primary: &MockServer, fallback: &MockServer) -> LocationResolver {
            let nominatim =
                NominatimProvider::new(&primary.uri(), "weather_app", Duration::from_millis(200)).unwrap();
            let owm = OpenWeatherGeocoder::new(&fallback.uri(), "KEY", Duration::from_secs(5)).unwrap();
            LocationResolver::new(vec![Box::new(nominatim), Box::new(owm)])
        }

        #[tokio::test]
        async fn primary_hit_never_touches_fallback() {
            let primary = MockServer::start().await;
            let fallback = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/search"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                    "lat": "51.5073219",
                    "lon": "-0.1276474",
                    "address": {"city": "London", "country": "United Kingdom"}
                }])))
                .mount(&primary)
                .await;
            Mock::given(method("GET"))
                .and(path("/geo/1.0/direct"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
                .expect(0)
                .mount(&fallback)
                .await;

            let location = resolver(&primary, &fallback).resolve("london").await.unwrap().unwrap();
            assert_eq!(location.name, "London, United Kingdom");
        }

        #[tokio::test]
        async fn primary_timeout_calls_fallback_once() {
            let primary = MockServer::start().await;
            let fallback = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/search"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!([]))
                        .set_delay(Duration::from_secs(2)),
                )
                .mount(&primary)
                .await;
            Mock::given(method("GET"))
                .and(path("/geo/1.0/direct"))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
                .expect(1)
                .mount(&fallback)
                .await;

            let resolved = resolver(&primary, &fallback).resolve("atlantis").await.unwrap();
            assert_eq!(resolved, None);
        }
    }
}
