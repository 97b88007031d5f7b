//! JSON shapes of the Gate v4 spot endpoints and their conversion into
//! domain types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use gatecmd_models::{
    BalanceRecord, CurrencyPair, Order, OrderStatus, OrderType, Side, Trade, TradeRole,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;

#[derive(Debug, Deserialize)]
pub struct SpotAccount {
    pub currency: String,
    pub available: Decimal,
    pub locked: Decimal,
}

impl From<SpotAccount> for BalanceRecord {
    fn from(account: SpotAccount) -> Self {
        BalanceRecord {
            currency: account.currency,
            available: account.available,
            locked: account.locked,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Ticker {
    pub currency_pair: String,
    #[serde(default)]
    pub last: Option<String>,
}

impl Ticker {
    /// `None` when the pair has not traded yet.
    pub fn last_price(&self) -> Option<Decimal> {
        parse_optional(self.last.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct WireCurrencyPair {
    pub id: String,
    pub base: String,
    pub quote: String,
    #[serde(default)]
    pub trade_status: String,
}

impl WireCurrencyPair {
    pub fn is_tradable(&self) -> bool {
        self.trade_status == "tradable"
    }
}

impl From<WireCurrencyPair> for CurrencyPair {
    fn from(pair: WireCurrencyPair) -> Self {
        CurrencyPair {
            id: pair.id,
            base: pair.base,
            quote: pair.quote,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireOrder {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub create_time_ms: Option<Decimal>,
    pub status: OrderStatus,
    pub currency_pair: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: Side,
    pub amount: Decimal,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub left: Option<Decimal>,
    #[serde(default)]
    pub filled_total: Option<Decimal>,
    #[serde(default)]
    pub avg_deal_price: Option<String>,
    #[serde(default)]
    pub fee: Option<Decimal>,
    #[serde(default)]
    pub fee_currency: Option<String>,
}

impl TryFrom<WireOrder> for Order {
    type Error = ExchangeError;

    fn try_from(order: WireOrder) -> Result<Self, Self::Error> {
        Ok(Order {
            id: parse_id(&order.id)?,
            client_id: order.text.filter(|t| !t.is_empty()),
            symbol: order.currency_pair,
            side: order.side,
            order_type: order.order_type,
            status: order.status,
            price: parse_optional(order.price.as_deref()).filter(|p| !p.is_zero()),
            amount: order.amount,
            left: order.left.unwrap_or(Decimal::ZERO),
            filled_total: order.filled_total.unwrap_or(Decimal::ZERO),
            avg_deal_price: parse_optional(order.avg_deal_price.as_deref())
                .filter(|p| !p.is_zero()),
            fee: order.fee.unwrap_or(Decimal::ZERO),
            fee_currency: order.fee_currency.filter(|c| !c.is_empty()),
            created_at: order.create_time_ms.and_then(timestamp_ms),
        })
    }
}

/// One entry of `GET /spot/open_orders`.
#[derive(Debug, Deserialize)]
pub struct OpenOrdersGroup {
    pub currency_pair: String,
    #[serde(default)]
    pub orders: Vec<WireOrder>,
}

#[derive(Debug, Deserialize)]
pub struct WireTrade {
    pub id: String,
    #[serde(default)]
    pub create_time_ms: Option<Decimal>,
    pub currency_pair: String,
    pub side: Side,
    pub role: TradeRole,
    pub amount: Decimal,
    pub price: Decimal,
    pub order_id: String,
    #[serde(default)]
    pub fee: Option<Decimal>,
    #[serde(default)]
    pub fee_currency: String,
}

impl TryFrom<WireTrade> for Trade {
    type Error = ExchangeError;

    fn try_from(trade: WireTrade) -> Result<Self, Self::Error> {
        Ok(Trade {
            id: parse_id(&trade.id)?,
            order_id: parse_id(&trade.order_id)?,
            symbol: trade.currency_pair,
            side: trade.side,
            role: trade.role,
            amount: trade.amount,
            price: trade.price,
            fee: trade.fee.unwrap_or(Decimal::ZERO),
            fee_currency: trade.fee_currency,
            created_at: trade.create_time_ms.and_then(timestamp_ms),
        })
    }
}

/// Body of `POST /spot/orders`.
#[derive(Debug, Serialize)]
pub struct NewOrderBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub currency_pair: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub account: &'static str,
    pub side: Side,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub time_in_force: &'static str,
}

impl NewOrderBody {
    pub fn limit(
        pair: &str,
        text: Option<String>,
        side: Side,
        price: Decimal,
        amount: Decimal,
    ) -> Self {
        Self {
            text,
            currency_pair: pair.to_string(),
            order_type: OrderType::Limit,
            account: "spot",
            side,
            amount,
            price: Some(price),
            time_in_force: "gtc",
        }
    }

    /// Market orders must be immediate-or-cancel and carry no price.
    pub fn market(pair: &str, text: Option<String>, side: Side, amount: Decimal) -> Self {
        Self {
            text,
            currency_pair: pair.to_string(),
            order_type: OrderType::Market,
            account: "spot",
            side,
            amount,
            price: None,
            time_in_force: "ioc",
        }
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub label: String,
    #[serde(default)]
    pub message: String,
}

const AUTH_LABELS: &[&str] = &[
    "INVALID_KEY",
    "INVALID_SIGNATURE",
    "INVALID_CREDENTIALS",
    "REQUEST_EXPIRED",
    "IP_FORBIDDEN",
    "FORBIDDEN",
    "MISSING_REQUIRED_HEADER",
];

/// Classify a failed response by status and body.
pub fn error_from_response(status: u16, body: &str) -> ExchangeError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();

    if status == 429 {
        return ExchangeError::RateLimited(
            parsed
                .map(|e| e.message)
                .unwrap_or_else(|| body.to_string()),
        );
    }

    match parsed {
        Some(err) if AUTH_LABELS.contains(&err.label.as_str()) => ExchangeError::Auth {
            label: err.label,
            message: err.message,
        },
        Some(err) => ExchangeError::Api {
            status,
            label: err.label,
            message: err.message,
        },
        None => ExchangeError::Decode(format!("HTTP {status}: {body}")),
    }
}

fn parse_id(id: &str) -> Result<u64, ExchangeError> {
    id.parse()
        .map_err(|_| ExchangeError::Decode(format!("invalid id: {id:?}")))
}

fn parse_optional(value: Option<&str>) -> Option<Decimal> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| Decimal::from_str(v).ok())
}

fn timestamp_ms(ms: Decimal) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms.trunc().to_i64()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_converts_from_gate_json() {
        let wire: WireOrder = serde_json::from_str(
            r#"{
                "id": "12332324",
                "text": "t-123456",
                "create_time": "1548000000",
                "create_time_ms": 1548000000123,
                "status": "open",
                "currency_pair": "ETH_BTC",
                "type": "limit",
                "account": "spot",
                "side": "buy",
                "amount": "1",
                "price": "5.00032",
                "time_in_force": "gtc",
                "left": "0.5",
                "filled_total": "2.50016",
                "fee": "0.005",
                "fee_currency": "ETH"
            }"#,
        )
        .unwrap();

        let order = Order::try_from(wire).unwrap();
        assert_eq!(order.id, 12332324);
        assert_eq!(order.client_id.as_deref(), Some("t-123456"));
        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.order_type, OrderType::Limit);
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.price, Some(dec!(5.00032)));
        assert_eq!(order.left, dec!(0.5));
        assert_eq!(
            order.created_at.map(|t| t.timestamp_millis()),
            Some(1548000000123)
        );
    }

    #[test]
    fn market_order_has_no_price() {
        let wire: WireOrder = serde_json::from_str(
            r#"{"id":"9","status":"closed","currency_pair":"BTC_USDT","type":"market",
                "side":"sell","amount":"0.01","price":"0","left":"0","filled_total":"300"}"#,
        )
        .unwrap();
        let order = Order::try_from(wire).unwrap();
        assert_eq!(order.price, None);
        assert_eq!(order.filled_total, dec!(300));
        assert_eq!(order.client_id, None);
    }

    #[test]
    fn non_numeric_order_id_is_decode_error() {
        let wire: WireOrder = serde_json::from_str(
            r#"{"id":"abc","status":"open","currency_pair":"BTC_USDT","type":"limit",
                "side":"buy","amount":"1","price":"1"}"#,
        )
        .unwrap();
        assert!(matches!(Order::try_from(wire), Err(ExchangeError::Decode(_))));
    }

    #[test]
    fn trade_converts_with_fractional_millis() {
        let wire: WireTrade = serde_json::from_str(
            r#"{"id":"1232893232","create_time":"1548000000","create_time_ms":"1548000000123.456",
                "currency_pair":"ETH_BTC","side":"sell","role":"taker","amount":"0.15",
                "price":"0.03","order_id":"4128442423","fee":"0.0005","fee_currency":"ETH"}"#,
        )
        .unwrap();
        let trade = Trade::try_from(wire).unwrap();
        assert_eq!(trade.order_id, 4128442423);
        assert_eq!(trade.role, TradeRole::Taker);
        assert_eq!(
            trade.created_at.map(|t| t.timestamp_millis()),
            Some(1548000000123)
        );
    }

    #[test]
    fn currency_pair_tradable_flag() {
        let wire: WireCurrencyPair = serde_json::from_str(
            r#"{"id":"BTC_USDT","base":"BTC","quote":"USDT","fee":"0.2",
                "min_base_amount":"0.0001","min_quote_amount":"1",
                "amount_precision":4,"precision":2,"trade_status":"tradable"}"#,
        )
        .unwrap();
        assert!(wire.is_tradable());
        let pair = CurrencyPair::from(wire);
        assert_eq!(pair.id, "BTC_USDT");
        assert_eq!(pair.base, "BTC");
    }

    #[test]
    fn ticker_without_trades_has_no_price() {
        let ticker: Ticker =
            serde_json::from_str(r#"{"currency_pair":"NEW_USDT","last":""}"#).unwrap();
        assert_eq!(ticker.last_price(), None);
        let ticker: Ticker =
            serde_json::from_str(r#"{"currency_pair":"BTC_USDT","last":"20000.1"}"#).unwrap();
        assert_eq!(ticker.last_price(), Some(dec!(20000.1)));
    }

    #[test]
    fn market_body_omits_price() {
        let body = NewOrderBody::market("BTC_USDT", None, Side::Buy, dec!(100));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "market");
        assert_eq!(json["time_in_force"], "ioc");
        assert_eq!(json["amount"], "100");
        assert!(json.get("price").is_none());
        assert!(json.get("text").is_none());
    }

    #[test]
    fn limit_body_carries_price_and_text() {
        let body = NewOrderBody::limit(
            "BTC_USDT",
            Some("t-ref".to_string()),
            Side::Sell,
            dec!(20000),
            dec!(0.5),
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["price"], "20000");
        assert_eq!(json["side"], "sell");
        assert_eq!(json["text"], "t-ref");
        assert_eq!(json["account"], "spot");
    }

    #[test]
    fn classifies_error_responses() {
        let err = error_from_response(
            400,
            r#"{"label":"BALANCE_NOT_ENOUGH","message":"Not enough balance"}"#,
        );
        assert!(err.is_rejection());

        let err = error_from_response(401, r#"{"label":"INVALID_KEY","message":"Invalid key"}"#);
        assert!(matches!(err, ExchangeError::Auth { .. }));

        let err = error_from_response(429, r#"{"label":"TOO_MANY_REQUESTS","message":"slow"}"#);
        assert!(matches!(err, ExchangeError::RateLimited(_)));

        let err = error_from_response(502, "<html>bad gateway</html>");
        assert!(matches!(err, ExchangeError::Decode(_)));
    }
}
