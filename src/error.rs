// Client-side error types produced by the envelope normalizer
use serde_json::{json, Value};
use thiserror::Error;

/// Message used whenever the real failure detail must not reach the user
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// Which side of the classification boundary produced the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a readable body (network, read or parse failure)
    Transport,
    /// The backend answered with a non-success status
    Application,
}

/// Classified API failure handed to callers of the normalizer.
///
/// `code` mirrors `status_code` unless the backend body supplies its own
/// value. Either may be absent when the failure happened before a status
/// was known.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: Option<u16>,
    pub code: Option<u16>,
}

impl ApiError {
    /// Sentinel error for a failed transport call with no status available
    pub fn server_error() -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: SERVER_ERROR_MESSAGE.to_string(),
            status_code: None,
            code: None,
        }
    }

    /// Sentinel error carrying whatever status the transport managed to report
    pub fn transport(status_code: Option<u16>) -> Self {
        Self {
            status_code,
            code: status_code,
            ..Self::server_error()
        }
    }

    pub fn application(
        message: impl Into<String>,
        status_code: Option<u16>,
        code: Option<u16>,
    ) -> Self {
        Self {
            kind: ErrorKind::Application,
            message: message.into(),
            status_code,
            code,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind == ErrorKind::Transport
    }

    /// JSON rendering used by the CLI output layer
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message,
            "status": self.status_code,
            "code": self.code,
        })
    }
}

/// Failures raised by a transport adapter before a response could be read
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Response body is not valid UTF-8")]
    InvalidBody(#[from] std::string::FromUtf8Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
