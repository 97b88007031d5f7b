use gatecmd_exchange::ExchangeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid order type: {0:?} (expected limit or market)")]
    InvalidOrderType(String),

    #[error("Invalid order side: {0:?} (expected buy or sell)")]
    InvalidSide(String),

    #[error("Invalid {field}: {value:?}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("Invalid order id: {0:?}")]
    InvalidOrderId(String),

    #[error("Unknown symbol {symbol}: {source}")]
    UnknownSymbol {
        symbol: String,
        source: ExchangeError,
    },

    #[error("{operation} rejected by exchange: {source}")]
    ExchangeRejected {
        operation: &'static str,
        source: ExchangeError,
    },

    #[error("{operation} failed: {source}")]
    TransportFailure {
        operation: &'static str,
        source: ExchangeError,
    },

    #[error("Value of {currency} is outside the decimal range")]
    ValuationOverflow { currency: String },

    #[error("Logger error: {0}")]
    Logging(String),

    #[error("Exchange client error: {0}")]
    Client(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Wrap an adapter failure, separating business rejections from transport failures.
    pub fn exchange(operation: &'static str, source: ExchangeError) -> Self {
        if source.is_rejection() {
            AgentError::ExchangeRejected { operation, source }
        } else {
            AgentError::TransportFailure { operation, source }
        }
    }

    /// True for errors detected locally, before any exchange call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AgentError::InvalidOrderType(_)
                | AgentError::InvalidSide(_)
                | AgentError::InvalidAmount { .. }
                | AgentError::InvalidOrderId(_)
        )
    }
}
