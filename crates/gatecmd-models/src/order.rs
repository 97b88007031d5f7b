use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Returned when a side or order type string names no known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseVariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for ParseVariantError {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(ParseVariantError {
                kind: "order side",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Limit,
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "limit",
            OrderType::Market => "market",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "limit" => Ok(OrderType::Limit),
            "market" => Ok(OrderType::Market),
            _ => Err(ParseVariantError {
                kind: "order type",
                value: s.to_string(),
            }),
        }
    }
}

/// An order request as it arrives from the command line.
///
/// Every field stays a string here. Which of `price`, `amount` and `total`
/// must be present (and parse) depends on the side/type combination, so the
/// dispatcher decides that per branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    /// Caller reference token. Empty means none.
    pub client_id: String,
    pub side: String,
    pub order_type: String,
    pub price: Option<String>,
    pub amount: Option<String>,
    pub total: Option<String>,
}

impl OrderRequest {
    pub fn limit(symbol: &str, side: &str, price: &str, amount: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            side: side.to_string(),
            order_type: "limit".to_string(),
            price: Some(price.to_string()),
            amount: Some(amount.to_string()),
            ..Default::default()
        }
    }

    /// Market buy spending `total` of the quote currency.
    pub fn market_buy(symbol: &str, total: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            side: "buy".to_string(),
            order_type: "market".to_string(),
            total: Some(total.to_string()),
            ..Default::default()
        }
    }

    /// Market sell of `amount` units of the base currency.
    pub fn market_sell(symbol: &str, amount: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            side: "sell".to_string(),
            order_type: "market".to_string(),
            amount: Some(amount.to_string()),
            ..Default::default()
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }
}

/// A tradable pair as the exchange names it (e.g. `BTC_USDT`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyPair {
    pub id: String,
    pub base: String,
    pub quote: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Closed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: u64,
    pub client_id: Option<String>,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// Absent for market orders.
    pub price: Option<Decimal>,
    /// Base quantity, or the quote total for a market buy.
    pub amount: Decimal,
    /// Portion of `amount` not yet filled.
    pub left: Decimal,
    pub filled_total: Decimal,
    pub avg_deal_price: Option<Decimal>,
    pub fee: Decimal,
    pub fee_currency: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Result of a placement: the exchange-assigned id, plus the full order
/// when the adapter returns one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderResult {
    pub id: u64,
    pub order: Option<Order>,
}

impl From<Order> for OrderResult {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order: Some(order),
        }
    }
}
