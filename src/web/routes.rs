use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - HTML pages and form posts
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/save", post(handlers::ui::save_handler))
        .route("/saved", get(handlers::ui::saved_handler))
        .route("/delete/{id}", post(handlers::ui::delete_handler))
        .route("/edit/{id}", get(handlers::ui::edit_handler))
        .route(
            "/update/{id}",
            get(handlers::ui::edit_handler).post(handlers::ui::update_handler),
        )
        .route("/static/{*path}", get(static_handler))
}

// API Routes - JSON access to the same data
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Saved queries
            .route(
                "/queries",
                get(handlers::api::list_queries).post(handlers::api::create_query),
            )
            .route(
                "/queries/{id}",
                get(handlers::api::get_query)
                    .put(handlers::api::update_query)
                    .delete(handlers::api::delete_query),
            )
            // Data export
            .route("/export", get(handlers::api::export_data))
            // Live lookup
            .route("/weather", get(handlers::api::weather_lookup))
            // System status
            .route("/status", get(handlers::api::system_status)),
    )
}
