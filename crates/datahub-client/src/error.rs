//! Errors raised by the catalogue client.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request never produced a response, or the body stream broke.
    #[error("failed to fetch from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a status of 300 or above.
    #[error("http status response from {url}: {status}")]
    Remote { url: String, status: StatusCode },

    /// The manifest body was not the expected JSON document.
    #[error("failed to unmarshal response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// URL of the failed request, when there was one.
    pub fn url(&self) -> Option<&str> {
        match self {
            ClientError::Transport { url, .. }
            | ClientError::Remote { url, .. }
            | ClientError::Decode { url, .. } => Some(url),
            ClientError::InvalidBaseUrl(_) | ClientError::Build(_) => None,
        }
    }
}
