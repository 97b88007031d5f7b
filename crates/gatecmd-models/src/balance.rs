use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One currency held by the account, as reported by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceRecord {
    /// Exchange-native symbol, e.g. "usdt" or "BTC".
    pub currency: String,
    pub available: Decimal,
    pub locked: Decimal,
}

impl BalanceRecord {
    pub fn new(currency: &str, available: Decimal, locked: Decimal) -> Self {
        Self {
            currency: currency.to_string(),
            available,
            locked,
        }
    }
}

/// Where the unit price of a valued balance came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// The currency is the quote currency itself.
    Quote,
    /// Last traded price of `{currency}_{quote}`.
    Market,
    /// Price lookup failed; the identity price was used.
    Fallback,
}

/// A balance record valued in the quote currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValuedBalance {
    pub currency: String,
    pub unit_price: Decimal,
    pub price_source: PriceSource,
    pub available_amount: Decimal,
    pub available_value: Decimal,
    pub locked_amount: Decimal,
    pub locked_value: Decimal,
    pub sum_amount: Decimal,
    pub sum_value: Decimal,
}

impl ValuedBalance {
    /// `None` when any product or sum leaves the `Decimal` range.
    ///
    /// Values carry at most 28 fractional digits; a product whose exact
    /// scale is larger is rounded to that scale.
    pub fn from_record(
        record: &BalanceRecord,
        unit_price: Decimal,
        source: PriceSource,
    ) -> Option<Self> {
        let available_value = unit_price.checked_mul(record.available)?;
        let locked_value = unit_price.checked_mul(record.locked)?;
        Some(Self {
            currency: record.currency.clone(),
            unit_price,
            price_source: source,
            available_amount: record.available,
            available_value,
            locked_amount: record.locked,
            locked_value,
            sum_amount: record.available.checked_add(record.locked)?,
            sum_value: available_value.checked_add(locked_value)?,
        })
    }
}

/// Per-currency valuations in snapshot order plus their grand total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioValuation {
    pub quote_currency: String,
    pub balances: Vec<ValuedBalance>,
    pub total: Decimal,
}
