use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum MonsoonError {
    /// The login call was rejected (HTTP status >= 400).
    #[error("Could not authenticate as '{username}' (HTTP {status})\n{message}")]
    Authentication {
        username: String,
        status: StatusCode,
        message: String,
    },

    /// One or more date/year fields were malformed or misordered. No request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request to {url} could not be completed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse API JSON (url={url}, status={status})")]
    Decode {
        url: String,
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    /// A data endpoint answered with a non-success status.
    #[error("API request failed: HTTP {status} for url ({url})\n{message}")]
    Api {
        status: StatusCode,
        url: String,
        message: String,
    },

    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("invalid API url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to read configuration file {}", .0.display())]
    ConfigFile(PathBuf, #[source] std::io::Error),

    #[error("login response carried an access token that cannot be sent as a header")]
    InvalidToken(#[source] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    pub(crate) detail: Option<String>,
}

/// Turns an error body into a human-readable message.
///
/// JSON bodies like `{"message": ...}` or `{"error": ..., "detail": ...}` are
/// flattened; anything else is passed through as text.
pub(crate) fn format_api_message(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "(empty response body)".to_string();
    }

    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(e) if e.message.is_some() || e.error.is_some() || e.detail.is_some() => {
            let title = e.message.as_deref().or(e.error.as_deref()).unwrap_or("");
            let detail = e.detail.as_deref().unwrap_or("");
            if detail.is_empty() {
                format!("Server message: {}", title)
            } else if title.is_empty() {
                format!("Server message: {}", detail)
            } else {
                format!("Server message: {}\n{}", title, detail)
            }
        }
        _ => body.to_string(),
    }
}
