use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::{with_store, NOT_FOUND_MESSAGE};
use crate::export::{self, ExportFormat, NO_DATA_MESSAGE};
use crate::store::filter::{FilterParams, QueryFilter};
use crate::store::models::{NewWeatherQuery, WeatherQuery};
use crate::web::handlers::ui::LookupParams;
use crate::web::state::{not_found_message, AppState, WeatherReport};

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
    #[serde(flatten)]
    pub filters: FilterParams,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub database: String,
    pub saved_query_count: i64,
}

// Saved queries

pub async fn list_queries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<WeatherQuery>>, (StatusCode, String)> {
    let filter = QueryFilter::from(&params);
    let queries = with_store(&state, move |store| store.list(&filter)).await?;
    Ok(Json(queries))
}

pub async fn create_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewWeatherQuery>,
) -> Result<(StatusCode, Json<WeatherQuery>), (StatusCode, String)> {
    let saved = with_store(&state, move |store| {
        let id = store.create(&payload)?;
        store.get(id)
    })
    .await?
    .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "Saved query vanished".to_string()))?;

    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<WeatherQuery>, (StatusCode, String)> {
    with_store(&state, move |store| store.get(id))
        .await?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()))
}

pub async fn update_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<NewWeatherQuery>,
) -> Result<Json<WeatherQuery>, (StatusCode, String)> {
    with_store(&state, move |store| {
        store.update(id, &payload)?;
        store.get(id)
    })
    .await?
    .map(Json)
    .ok_or((StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()))
}

pub async fn delete_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    with_store(&state, move |store| store.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Export

pub async fn export_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Result<Response, (StatusCode, String)> {
    let format: ExportFormat = params
        .format
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|e: export::ExportError| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let filter = QueryFilter::from(&params.filters);
    let records = with_store(&state, move |store| store.list(&filter)).await?;

    if records.is_empty() {
        return Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            NO_DATA_MESSAGE,
        )
            .into_response());
    }

    let export = export::export(&records, format).map_err(|e| {
        error!("Export to {} failed: {}", format, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Export failed".to_string())
    })?;
    info!("Exported {} queries as {}", records.len(), format);

    let response = match format {
        ExportFormat::Csv => (
            [
                (header::CONTENT_TYPE, export.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", export.file_name),
                ),
            ],
            export.body,
        )
            .into_response(),
        _ => ([(header::CONTENT_TYPE, export.content_type)], export.body).into_response(),
    };

    Ok(response)
}

// Weather lookup

pub async fn weather_lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<WeatherReport>, (StatusCode, String)> {
    let query = params.location.unwrap_or_default().trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Missing 'location' parameter".to_string()));
    }

    match state.weather_report(&query).await {
        Ok(Some(report)) => Ok(Json(report)),
        Ok(None) => Err((StatusCode::NOT_FOUND, not_found_message(&query))),
        Err(e) => {
            error!("Weather lookup for '{}' failed: {}", query, e);
            Err((StatusCode::BAD_GATEWAY, e.user_message()))
        }
    }
}

// System status
pub async fn system_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemStatus>, (StatusCode, String)> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(state.startup_time).num_seconds();
    let saved_query_count = with_store(&state, |store| store.count()).await?;

    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        database: state.config.database.connection_string.clone(),
        saved_query_count,
    }))
}
