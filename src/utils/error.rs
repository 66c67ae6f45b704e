use crate::domain::model::ResponseSnapshot;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned {}", .response.status)]
    Status {
        method: String,
        url: String,
        response: Box<ResponseSnapshot>,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
        response: Box<ResponseSnapshot>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Scenario failed: {message}")]
    Scenario { message: String },
}

impl HarnessError {
    /// The server response attached to this error, if the call got that far.
    pub fn response(&self) -> Option<&ResponseSnapshot> {
        match self {
            HarnessError::Status { response, .. } | HarnessError::Decode { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
