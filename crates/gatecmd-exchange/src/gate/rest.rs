use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use gatecmd_models::{BalanceRecord, CurrencyPair, Order, OrderResult, Side, Trade};
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::ExchangeClient;
use crate::error::ExchangeError;
use crate::gate::sign::sign_request;
use crate::gate::symbol::{normalize_pair, order_text};
use crate::gate::wire::{
    error_from_response, NewOrderBody, OpenOrdersGroup, SpotAccount, Ticker, WireCurrencyPair,
    WireOrder, WireTrade,
};

const API_PREFIX: &str = "/api/v4";

/// REST client for the Gate.io spot API v4.
#[derive(Clone)]
pub struct GateSpotV4 {
    client: Client,
    host: String,
    key: String,
    secret: String,
}

impl GateSpotV4 {
    pub fn new(
        key: &str,
        secret: &str,
        host: &str,
        timeout: Duration,
    ) -> Result<Self, ExchangeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            key: key.to_string(),
            secret: secret.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn get<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        path: &str,
        query: &[(&str, &str)],
        signed: bool,
    ) -> Result<T, ExchangeError> {
        self.request(cancel, Method::GET, path, query, String::new(), signed)
            .await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ExchangeError> {
        let body = serde_json::to_string(body)
            .map_err(|e| ExchangeError::Decode(format!("failed to encode request body: {e}")))?;
        self.request(cancel, method, path, &[], body, true).await
    }

    /// Send one request, racing it against `cancel`.
    async fn request<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: String,
        signed: bool,
    ) -> Result<T, ExchangeError> {
        let full_path = format!("{API_PREFIX}{path}");
        let query = encode_query(query);
        let url = if query.is_empty() {
            format!("{}{}", self.host, full_path)
        } else {
            format!("{}{}?{}", self.host, full_path, query)
        };

        debug!(method = %method, path = %full_path, query = %query, "Gate request");

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");
        if signed {
            let headers = sign_request(
                &self.key,
                &self.secret,
                method.as_str(),
                &full_path,
                &query,
                &body,
                Utc::now().timestamp(),
            );
            builder = builder
                .header("KEY", headers.key)
                .header("Timestamp", headers.timestamp)
                .header("SIGN", headers.sign);
        }
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let exchange = async {
            let resp = builder.send().await?;
            let status = resp.status();
            let text = resp.text().await?;
            if !status.is_success() {
                return Err(error_from_response(status.as_u16(), &text));
            }
            serde_json::from_str(&text)
                .map_err(|e| ExchangeError::Decode(format!("{e} in response to {full_path}")))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ExchangeError::Cancelled),
            result = exchange => result,
        }
    }
}

#[async_trait]
impl ExchangeClient for GateSpotV4 {
    async fn get_balances(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<BalanceRecord>, ExchangeError> {
        let accounts: Vec<SpotAccount> = self.get(cancel, "/spot/accounts", &[], true).await?;
        Ok(accounts.into_iter().map(BalanceRecord::from).collect())
    }

    async fn get_last_price(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<Decimal, ExchangeError> {
        let pair = normalize_pair(symbol);
        let tickers: Vec<Ticker> = self
            .get(cancel, "/spot/tickers", &[("currency_pair", pair.as_str())], false)
            .await?;
        tickers
            .into_iter()
            .find(|t| t.currency_pair == pair)
            .and_then(|t| t.last_price())
            .ok_or_else(|| ExchangeError::NotFound(format!("no last price for {pair}")))
    }

    async fn list_open_orders(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<Vec<Order>, ExchangeError> {
        let wire_orders: Vec<WireOrder> = if symbol.trim().is_empty() {
            let groups: Vec<OpenOrdersGroup> =
                self.get(cancel, "/spot/open_orders", &[], true).await?;
            groups.into_iter().flat_map(|g| g.orders).collect()
        } else {
            let pair = normalize_pair(symbol);
            self.get(
                cancel,
                "/spot/orders",
                &[("currency_pair", pair.as_str()), ("status", "open")],
                true,
            )
            .await?
        };
        wire_orders.into_iter().map(Order::try_from).collect()
    }

    async fn resolve_symbol(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<CurrencyPair, ExchangeError> {
        let pair = normalize_pair(symbol);
        if pair.is_empty() {
            return Err(ExchangeError::NotFound("empty currency pair".to_string()));
        }
        let path = format!("/spot/currency_pairs/{}", urlencoding::encode(&pair));
        let wire: WireCurrencyPair = self.get(cancel, &path, &[], false).await?;
        if !wire.is_tradable() {
            return Err(ExchangeError::NotFound(format!(
                "{} is not tradable (status {:?})",
                wire.id, wire.trade_status
            )));
        }
        Ok(wire.into())
    }

    async fn place_limit_order(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
        client_id: &str,
        side: Side,
        price: Decimal,
        amount: Decimal,
    ) -> Result<OrderResult, ExchangeError> {
        let body = NewOrderBody::limit(
            &normalize_pair(symbol),
            order_text(client_id),
            side,
            price,
            amount,
        );
        let order: WireOrder = self
            .send_json(cancel, Method::POST, "/spot/orders", &body)
            .await?;
        Ok(Order::try_from(order)?.into())
    }

    async fn place_market_order(
        &self,
        cancel: &CancellationToken,
        pair: &CurrencyPair,
        client_id: &str,
        side: Side,
        amount_or_total: Decimal,
    ) -> Result<OrderResult, ExchangeError> {
        let body = NewOrderBody::market(&pair.id, order_text(client_id), side, amount_or_total);
        let order: WireOrder = self
            .send_json(cancel, Method::POST, "/spot/orders", &body)
            .await?;
        Ok(Order::try_from(order)?.into())
    }

    async fn cancel_order(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
        order_id: u64,
    ) -> Result<Order, ExchangeError> {
        let pair = normalize_pair(symbol);
        let path = format!("/spot/orders/{order_id}");
        let order: WireOrder = self
            .request(
                cancel,
                Method::DELETE,
                &path,
                &[("currency_pair", pair.as_str())],
                String::new(),
                true,
            )
            .await?;
        Order::try_from(order)
    }

    async fn get_trades(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
        order_id: Option<u64>,
    ) -> Result<Vec<Trade>, ExchangeError> {
        let pair = normalize_pair(symbol);
        let order_id = order_id.map(|id| id.to_string());
        let mut query = vec![("currency_pair", pair.as_str())];
        if let Some(id) = &order_id {
            query.push(("order_id", id.as_str()));
        }
        let trades: Vec<WireTrade> = self.get(cancel, "/spot/my_trades", &query, true).await?;
        trades.into_iter().map(Trade::try_from).collect()
    }
}

fn encode_query(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_encoded_in_order() {
        assert_eq!(
            encode_query(&[("currency_pair", "BTC_USDT"), ("order_id", "42")]),
            "currency_pair=BTC_USDT&order_id=42"
        );
        assert_eq!(encode_query(&[("text", "a b")]), "text=a%20b");
        assert_eq!(encode_query(&[]), "");
    }

    #[test]
    fn host_trailing_slash_is_trimmed() {
        let client = GateSpotV4::new("k", "s", "https://api.gateio.ws/", Duration::from_secs(5))
            .unwrap();
        assert_eq!(client.host(), "https://api.gateio.ws");
    }

    #[tokio::test]
    async fn cancelled_token_aborts_request() {
        // Unroutable host: the request can only finish through cancellation.
        let client =
            GateSpotV4::new("k", "s", "http://10.255.255.1", Duration::from_secs(30)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = client.get_balances(&cancel).await;
        assert!(matches!(result, Err(ExchangeError::Cancelled)));
    }

    #[tokio::test]
    async fn empty_symbol_does_not_resolve() {
        let client =
            GateSpotV4::new("k", "s", "http://10.255.255.1", Duration::from_secs(30)).unwrap();
        let result = client
            .resolve_symbol(&CancellationToken::new(), "  ")
            .await;
        assert!(matches!(result, Err(ExchangeError::NotFound(_))));
    }
}
