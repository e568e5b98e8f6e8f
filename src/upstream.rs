//! Plumbing shared by the geocoding providers and the weather fetcher.

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The provider answered with a non-success status
    #[error("{status} from {url}")]
    Status { status: StatusCode, url: String },
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("unexpected response document: {0}")]
    Document(String),
    #[error("client configuration error: {0}")]
    Config(String),
}

// reqwest prints the request URL, which carries the API key
impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Transport(e.without_url())
    }
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Transport(e) if e.is_timeout())
    }

    /// Text shown to a person when a lookup fails.
    pub fn user_message(&self) -> String {
        match self {
            UpstreamError::Status { .. } => format!("API error: {}", self),
            _ => format!("Something went wrong: {}", self),
        }
    }
}

pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, UpstreamError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| UpstreamError::Config(e.to_string()))
}

/// Fails on any non-2xx status, keeping the URL for the error message.
pub fn check_status(response: Response) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let mut url = response.url().clone();
        // Never echo credentials back to the page
        url.set_query(None);
        Err(UpstreamError::Status {
            status,
            url: url.to_string(),
        })
    }
}

pub async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| UpstreamError::Document(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_read_as_api_errors() {
        let err = UpstreamError::Status {
            status: StatusCode::UNAUTHORIZED,
            url: "https://api.example.test/data/2.5/weather".to_string(),
        };
        let message = err.user_message();
        assert!(message.starts_with("API error: 401"), "{}", message);
        assert!(!err.is_timeout());
    }

    #[test]
    fn other_errors_read_as_generic_failures() {
        let err = UpstreamError::Document("missing field `list`".to_string());
        assert!(err.user_message().starts_with("Something went wrong: "));
    }
}
