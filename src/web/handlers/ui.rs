use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use minijinja::context;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use super::{with_store, NOT_FOUND_MESSAGE};
use crate::store::filter::{FilterParams, QueryFilter};
use crate::store::models::NewWeatherQuery;
use crate::web::state::{not_found_message, AppState};
use crate::web::templates::render_template;

#[derive(Debug, Deserialize, Default)]
pub struct LookupParams {
    pub location: Option<String>,
}

// Lookup page: current weather + forecast for `?location=`, plus the saved list
pub async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Response {
    let query = params.location.unwrap_or_default().trim().to_string();
    let mut report = None;
    let mut error = None;

    if !query.is_empty() {
        match state.weather_report(&query).await {
            Ok(Some(found)) => report = Some(found),
            Ok(None) => error = Some(not_found_message(&query)),
            Err(e) => {
                error!("Weather lookup for '{}' failed: {}", query, e);
                error = Some(e.user_message());
            }
        }
    }

    let (saved_queries, saved_error) =
        match with_store(&state, |store| store.list(&QueryFilter::default())).await {
            Ok(queries) => (queries, None),
            Err((_, message)) => (Vec::new(), Some(format!("Could not load saved queries: {}", message))),
        };

    let ctx = context! {
        query => query,
        place => report.as_ref().map(|r| r.location.name.clone()),
        weather => report.as_ref().map(|r| r.current.clone()),
        forecast => report.as_ref().map(|r| r.forecast.clone()),
        geo_lat => report.as_ref().map(|r| r.location.lat),
        geo_lon => report.as_ref().map(|r| r.location.lon),
        error => error,
        saved_queries => saved_queries,
        saved_error => saved_error,
    };

    Html(render_template(&state.template_env, "index.html", ctx)).into_response()
}

pub async fn save_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewWeatherQuery>,
) -> Result<Redirect, (StatusCode, String)> {
    let id = with_store(&state, move |store| store.create(&form)).await?;
    info!("Saved query {} from form", id);
    Ok(Redirect::to("/saved"))
}

pub async fn saved_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let filter = QueryFilter::from(&params);
    let filtered = !filter.is_empty();
    let queries = with_store(&state, move |store| store.list(&filter)).await?;

    let ctx = context! {
        queries => queries,
        filtered => filtered,
        lat => params.lat,
        lon => params.lon,
    };
    Ok(Html(render_template(&state.template_env, "saved.html", ctx)))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Redirect, (StatusCode, String)> {
    with_store(&state, move |store| store.delete(id)).await?;
    Ok(Redirect::to("/saved"))
}

// Serves both GET /edit/{id} and GET /update/{id}
pub async fn edit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Html<String>, (StatusCode, String)> {
    let query = with_store(&state, move |store| store.get(id))
        .await?
        .ok_or((StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()))?;

    Ok(Html(render_template(&state.template_env, "edit.html", context! { query => query })))
}

pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(form): Form<NewWeatherQuery>,
) -> Result<Redirect, (StatusCode, String)> {
    with_store(&state, move |store| store.update(id, &form)).await?;
    Ok(Redirect::to("/saved"))
}
