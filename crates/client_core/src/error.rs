use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Interprets a status failure body as a backend error, if there is one.
    pub fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Status { status, body } => Some(ApiError::from_response(*status, body)),
            _ => None,
        }
    }
}
