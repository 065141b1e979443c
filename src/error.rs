use reqwest::StatusCode;
use std::time::Duration;

/// Errors produced while driving the upload / translate / poll workflow.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// A required input or environment value is missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The OAuth2 client-credentials exchange was rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },
    #[error("Invalid region `{0}`, expected `us` or `emea`")]
    InvalidRegion(String),
    /// The service answered with a non-2xx status.
    #[error("API request failed ({status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("Network request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse API response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URN `{urn}`: {reason}")]
    InvalidUrn { urn: String, reason: String },
    /// The manifest did not reach `complete` before the poll deadline.
    #[error("Manifest for {urn} did not complete within {elapsed:?}")]
    PollTimeout { urn: String, elapsed: Duration },
    #[error("Operation cancelled")]
    Cancelled,
}

impl ForgeError {
    /// `true` when the service reported that the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ForgeError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// `true` for failures worth retrying: server errors, throttling and
    /// transport-level timeouts or connection resets.
    pub fn is_transient(&self) -> bool {
        match self {
            ForgeError::Api { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ForgeError::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Lifts a 404 into `Ok(None)` and leaves every other outcome untouched.
pub(crate) fn found<T>(result: Result<T, ForgeError>) -> Result<Option<T>, ForgeError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
