pub mod api;
pub mod ui;

use axum::http::StatusCode;
use std::sync::Arc;
use tracing::error;

use crate::store::{QueryStore, StoreError};
use crate::web::state::AppState;

pub const NOT_FOUND_MESSAGE: &str = "Weather query not found!";

/// Runs a store call on the blocking pool and maps failures to a response.
pub async fn with_store<T, F>(state: &Arc<AppState>, f: F) -> Result<T, (StatusCode, String)>
where
    F: FnOnce(&QueryStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| {
            error!("Store task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
        })?
        .map_err(store_error)
}

pub fn store_error(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()),
        StoreError::InvalidDateRange { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
        StoreError::Pool(_) | StoreError::Database(_) | StoreError::Corrupt(_) => {
            error!("Store error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
        }
    }
}
