use reqwest::StatusCode;
use shared::{
    error::{ApiErrorBody, ErrorCode, FieldError},
    protocol::PageDecodeError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("request rejected ({status}): {message}")]
    Validation {
        status: u16,
        message: String,
        field_errors: Vec<FieldError>,
    },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Transport(_) | ClientError::InvalidBaseUrl { .. } => ErrorCode::Transport,
            ClientError::NotFound(_) => ErrorCode::NotFound,
            ClientError::Validation { .. } => ErrorCode::Validation,
            ClientError::Server { .. } => ErrorCode::Server,
            ClientError::Decode(_) => ErrorCode::Decode,
        }
    }

    /// Failures worth another attempt: connectivity and gateway-style 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Server { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClientError::Validation { field_errors, .. } => field_errors,
            _ => &[],
        }
    }

    /// Maps a non-success status and its (possibly empty) body.
    pub(crate) fn from_status(status: StatusCode, resource: &str, body: &str) -> Self {
        let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
        let detail = match &parsed {
            Some(parsed) => parsed.summary().map(str::to_string),
            None => {
                let text = body.trim();
                (!text.is_empty() && text.len() <= 200).then(|| text.to_string())
            }
        };
        let message = detail
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("status {}", status.as_u16()));

        if status == StatusCode::NOT_FOUND {
            ClientError::NotFound(resource.to_string())
        } else if status.is_client_error() {
            ClientError::Validation {
                status: status.as_u16(),
                message,
                field_errors: parsed.map(|parsed| parsed.errors).unwrap_or_default(),
            }
        } else {
            ClientError::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<PageDecodeError> for ClientError {
    fn from(err: PageDecodeError) -> Self {
        ClientError::Decode(err.to_string())
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
