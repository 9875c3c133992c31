use thiserror::Error;

/// Failure of a single upstream call, roster or identifier alike.
///
/// Nothing here is fatal: the roster path keeps the last good roster and the
/// identifier path falls back to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP Error: {code}")]
    Status { code: u16, body: String },
    #[error("invalid payload: {0}")]
    Payload(String),
    #[error("not found")]
    NotFound,
}

impl FetchError {
    pub fn from_status(code: u16, body: impl Into<String>) -> Self {
        match code {
            204 | 404 => FetchError::NotFound,
            _ => FetchError::Status {
                code,
                body: body.into(),
            },
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Payload(err.to_string())
    }
}
