use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Which stage of the pipeline produced an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    Validation,
    Encoding,
    Server,
    Connectivity,
    #[default]
    Unknown,
}

/// Normalized failure surfaced to the UI, whatever the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display(fmt = "{}", message)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip)]
    pub kind: ErrorKind,
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            kind,
        }
    }

    pub fn server(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            code: Some(status.to_string()),
            kind: ErrorKind::Server,
        }
    }

    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connectivity, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }
}
