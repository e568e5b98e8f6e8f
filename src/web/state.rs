use minijinja::Environment;
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::geocode::{LocationResolver, ResolvedLocation};
use crate::store::QueryStore;
use crate::upstream::UpstreamError;
use crate::weather::models::{ForecastDay, WeatherSnapshot};
use crate::weather::WeatherClient;
use crate::web::templates::init_templates;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub store: QueryStore,
    pub resolver: LocationResolver,
    pub weather: WeatherClient,
    pub template_env: Environment<'static>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

/// Everything the lookup page shows for one place.
#[derive(Debug, Serialize)]
pub struct WeatherReport {
    pub location: ResolvedLocation,
    pub current: WeatherSnapshot,
    pub forecast: Vec<ForecastDay>,
}

impl AppState {
    pub fn new(config: AppConfig, db_pool: DbPool) -> Result<Self, UpstreamError> {
        let resolver = LocationResolver::from_config(&config)?;
        let weather = WeatherClient::new(&config.weather)?;

        Ok(Self {
            store: QueryStore::new(db_pool),
            resolver,
            weather,
            template_env: init_templates(),
            startup_time: chrono::Utc::now(),
            config,
        })
    }

    /// Geocodes `query`, then fetches current conditions and the forecast.
    /// `Ok(None)` means no geocoder knew the place.
    pub async fn weather_report(&self, query: &str) -> Result<Option<WeatherReport>, UpstreamError> {
        let Some(location) = self.resolver.resolve(query).await? else {
            return Ok(None);
        };

        let current = self.weather.current_weather(location.lat, location.lon).await?;
        let forecast = self.weather.forecast(location.lat, location.lon).await?;
        info!("Weather for {}: {} days of forecast", location.name, forecast.len());

        Ok(Some(WeatherReport {
            location,
            current,
            forecast,
        }))
    }
}

pub fn not_found_message(query: &str) -> String {
    format!(
        "Could not find a location for '{}'. Try a city, town, or zip/postal code.",
        query
    )
}
