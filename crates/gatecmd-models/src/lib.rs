pub mod balance;
pub mod config;
pub mod order;
pub mod trade;

pub use balance::{BalanceRecord, PortfolioValuation, PriceSource, ValuedBalance};
pub use config::{ConfigError, ExchangeConfig, GateCmdConfig, LogConfig, LogFormat};
pub use order::{
    CurrencyPair, Order, OrderRequest, OrderResult, OrderStatus, OrderType, ParseVariantError,
    Side,
};
pub use trade::{Trade, TradeRole};
