use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unsupported endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Invalid parameters for {endpoint}: {reason}")]
    InvalidParams { endpoint: String, reason: String },

    #[error("Invalid object ID: {0}")]
    InvalidObjectId(String),

    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    #[error("Method {method} is not implemented in the Eventbrite API.")]
    MethodNotImplemented { method: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote API error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn no_token() -> Self {
        ApiError::Unauthorized {
            status: 400,
            message: "No token present for the Eventbrite API.".to_string(),
        }
    }

    /// HTTP-like status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Remote { status, .. } => Some(*status),
            ApiError::MethodNotImplemented { .. } => Some(500),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Validation failures are detected before any network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApiError::UnknownEndpoint(_) | ApiError::InvalidParams { .. } | ApiError::InvalidObjectId(_)
        )
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
