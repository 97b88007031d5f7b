use async_trait::async_trait;
use gatecmd_models::{BalanceRecord, CurrencyPair, Order, OrderResult, Side, Trade};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::error::ExchangeError;

/// Account and trading operations of a spot exchange. Mockable for testing.
///
/// Every call takes the command's cancellation token and must give up with
/// [`ExchangeError::Cancelled`] once it fires. Implementations make a single
/// attempt per call.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    async fn get_balances(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<BalanceRecord>, ExchangeError>;

    /// Last traded price of `symbol` (e.g. `btc_usdt`).
    async fn get_last_price(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<Decimal, ExchangeError>;

    /// Open orders for `symbol`, or for every pair when `symbol` is empty.
    async fn list_open_orders(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<Vec<Order>, ExchangeError>;

    /// Map a user-entered symbol to the exchange's tradable pair.
    async fn resolve_symbol(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<CurrencyPair, ExchangeError>;

    async fn place_limit_order(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
        client_id: &str,
        side: Side,
        price: Decimal,
        amount: Decimal,
    ) -> Result<OrderResult, ExchangeError>;

    /// `amount_or_total` is the quote-currency spend for a buy and the
    /// base-currency quantity for a sell.
    async fn place_market_order(
        &self,
        cancel: &CancellationToken,
        pair: &CurrencyPair,
        client_id: &str,
        side: Side,
        amount_or_total: Decimal,
    ) -> Result<OrderResult, ExchangeError>;

    async fn cancel_order(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
        order_id: u64,
    ) -> Result<Order, ExchangeError>;

    async fn get_trades(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
        order_id: Option<u64>,
    ) -> Result<Vec<Trade>, ExchangeError>;
}
