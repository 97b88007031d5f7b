use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Exchange rejected request (HTTP {status}) {label}: {message}")]
    Api {
        status: u16,
        label: String,
        message: String,
    },

    #[error("Authentication failed {label}: {message}")]
    Auth { label: String, message: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl ExchangeError {
    /// True when the exchange understood the request and refused it on
    /// business grounds (insufficient balance, invalid amount, ...).
    pub fn is_rejection(&self) -> bool {
        matches!(self, ExchangeError::Api { .. })
    }
}
