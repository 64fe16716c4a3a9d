use thiserror::Error;

/// Failure of a single round trip against the items resource.
#[derive(Debug, Error)]
pub enum ItemsApiError {
    #[error("invalid items api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// The request never produced a response (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("server responded with status {status}: {message}")]
    Server { status: u16, message: String },
    #[error("invalid {what} response from server: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ItemsApiError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}
