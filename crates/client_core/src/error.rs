use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("HTTP error! status: {}", .status.as_u16())]
    Status { status: StatusCode },
    #[error("Backend error: {status} - {body}")]
    Backend { status: StatusCode, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status } | ClientError::Backend { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status(),
            ClientError::InvalidUrl { .. } => None,
        }
    }
}
