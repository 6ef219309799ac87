use model::ModelError;
use thiserror::Error;

/// Failure of one request against the transactions API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response (connect error, timeout)
    #[error("Request failed: {0}")]
    Network(String),

    /// Non-2xx response, with the server's description when it sent one
    #[error("HTTP {status}")]
    Http { status: u16, description: Option<String> },

    /// A 2xx response whose body is not JSON
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// The configured token cannot be sent as a header value
    #[error("Invalid request header: {0}")]
    Header(String),
}

impl FetchError {
    /// Message shown to the user: the server's description, then the HTTP
    /// status, then the transport error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http {
                description: Some(description),
                ..
            } if !description.trim().is_empty() => description.clone(),
            Self::Http { status, .. } => format!("HTTP {}", status),
            Self::Network(message) | Self::Decode(message) | Self::Header(message) => message.clone(),
        }
    }
}

/// Rejected user input on the control surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),

    #[error("'{0}' is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Page size must be greater than zero")]
    ZeroPageSize,

    #[error("Expected FIELD=VALUE, got '{0}'")]
    InvalidFilter(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}
