//! Test support module providing an in-memory exchange.
//!
//! `MockExchange` answers from canned balances, prices, orders and trades and
//! records every call it receives in order, so tests can assert both what the
//! core returned and which exchange operations it attempted.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use gatecmd_exchange::{ExchangeClient, ExchangeError};
use gatecmd_models::{
    BalanceRecord, CurrencyPair, Order, OrderResult, OrderStatus, OrderType, Side, Trade,
};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

/// One recorded exchange call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetBalances,
    GetLastPrice(String),
    ListOpenOrders(String),
    ResolveSymbol(String),
    PlaceLimit {
        symbol: String,
        client_id: String,
        side: Side,
        price: Decimal,
        amount: Decimal,
    },
    PlaceMarket {
        pair: String,
        client_id: String,
        side: Side,
        amount_or_total: Decimal,
    },
    CancelOrder {
        symbol: String,
        order_id: u64,
    },
    GetTrades {
        symbol: String,
        order_id: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Failure {
    #[default]
    None,
    Reject,
    Transport,
}

pub struct MockExchange {
    calls: Mutex<Vec<Call>>,
    balances: Vec<BalanceRecord>,
    prices: HashMap<String, Decimal>,
    open_orders: Vec<Order>,
    trades: Vec<Trade>,
    unknown_symbols: HashSet<String>,
    next_order_id: u64,
    failure: Failure,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExchange {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            balances: Vec::new(),
            prices: HashMap::new(),
            open_orders: Vec::new(),
            trades: Vec::new(),
            unknown_symbols: HashSet::new(),
            next_order_id: 1000,
            failure: Failure::None,
        }
    }

    pub fn with_balances(mut self, balances: Vec<BalanceRecord>) -> Self {
        self.balances = balances;
        self
    }

    /// Last price for `symbol`, matched case-insensitively.
    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_lowercase(), price);
        self
    }

    pub fn with_open_orders(mut self, orders: Vec<Order>) -> Self {
        self.open_orders = orders;
        self
    }

    pub fn with_trades(mut self, trades: Vec<Trade>) -> Self {
        self.trades = trades;
        self
    }

    /// Make symbol resolution fail for `symbol`.
    pub fn with_unknown_symbol(mut self, symbol: &str) -> Self {
        self.unknown_symbols.insert(symbol.to_lowercase());
        self
    }

    /// Id assigned to the next placed order.
    pub fn with_order_id(mut self, id: u64) -> Self {
        self.next_order_id = id;
        self
    }

    /// Reject every placement with a business error.
    pub fn rejecting_orders(mut self) -> Self {
        self.failure = Failure::Reject;
        self
    }

    /// Fail every call with a transport-level error.
    pub fn failing_transport(mut self) -> Self {
        self.failure = Failure::Transport;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn record(&self, call: Call) -> Result<(), ExchangeError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.failure == Failure::Transport {
            return Err(ExchangeError::Decode("mock transport failure".to_string()));
        }
        Ok(())
    }

    fn placement_failure(&self) -> Result<(), ExchangeError> {
        if self.failure == Failure::Reject {
            return Err(ExchangeError::Api {
                status: 400,
                label: "BALANCE_NOT_ENOUGH".to_string(),
                message: "Not enough balance".to_string(),
            });
        }
        Ok(())
    }

    fn new_order(
        &self,
        symbol: &str,
        client_id: &str,
        side: Side,
        order_type: OrderType,
        price: Option<Decimal>,
        amount: Decimal,
    ) -> Order {
        Order {
            id: self.next_order_id,
            client_id: (!client_id.is_empty()).then(|| client_id.to_string()),
            symbol: symbol.to_uppercase(),
            side,
            order_type,
            status: OrderStatus::Open,
            price,
            amount,
            left: amount,
            filled_total: Decimal::ZERO,
            avg_deal_price: None,
            fee: Decimal::ZERO,
            fee_currency: None,
            created_at: None,
        }
    }
}

#[async_trait]
impl ExchangeClient for MockExchange {
    async fn get_balances(
        &self,
        _cancel: &CancellationToken,
    ) -> Result<Vec<BalanceRecord>, ExchangeError> {
        self.record(Call::GetBalances)?;
        Ok(self.balances.clone())
    }

    async fn get_last_price(
        &self,
        _cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<Decimal, ExchangeError> {
        self.record(Call::GetLastPrice(symbol.to_string()))?;
        self.prices
            .get(&symbol.to_lowercase())
            .copied()
            .ok_or_else(|| ExchangeError::NotFound(format!("no last price for {symbol}")))
    }

    async fn list_open_orders(
        &self,
        _cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<Vec<Order>, ExchangeError> {
        self.record(Call::ListOpenOrders(symbol.to_string()))?;
        Ok(self
            .open_orders
            .iter()
            .filter(|o| symbol.is_empty() || o.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
            .collect())
    }

    async fn resolve_symbol(
        &self,
        _cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<CurrencyPair, ExchangeError> {
        self.record(Call::ResolveSymbol(symbol.to_string()))?;
        if self.unknown_symbols.contains(&symbol.to_lowercase()) {
            return Err(ExchangeError::NotFound(format!("{symbol} is not tradable")));
        }
        let id = symbol.to_uppercase().replace(['/', '-'], "_");
        let (base, quote) = id.split_once('_').unwrap_or((id.as_str(), ""));
        Ok(CurrencyPair {
            base: base.to_string(),
            quote: quote.to_string(),
            id: id.clone(),
        })
    }

    async fn place_limit_order(
        &self,
        _cancel: &CancellationToken,
        symbol: &str,
        client_id: &str,
        side: Side,
        price: Decimal,
        amount: Decimal,
    ) -> Result<OrderResult, ExchangeError> {
        self.record(Call::PlaceLimit {
            symbol: symbol.to_string(),
            client_id: client_id.to_string(),
            side,
            price,
            amount,
        })?;
        self.placement_failure()?;
        Ok(self
            .new_order(symbol, client_id, side, OrderType::Limit, Some(price), amount)
            .into())
    }

    async fn place_market_order(
        &self,
        _cancel: &CancellationToken,
        pair: &CurrencyPair,
        client_id: &str,
        side: Side,
        amount_or_total: Decimal,
    ) -> Result<OrderResult, ExchangeError> {
        self.record(Call::PlaceMarket {
            pair: pair.id.clone(),
            client_id: client_id.to_string(),
            side,
            amount_or_total,
        })?;
        self.placement_failure()?;
        Ok(self
            .new_order(&pair.id, client_id, side, OrderType::Market, None, amount_or_total)
            .into())
    }

    async fn cancel_order(
        &self,
        _cancel: &CancellationToken,
        symbol: &str,
        order_id: u64,
    ) -> Result<Order, ExchangeError> {
        self.record(Call::CancelOrder {
            symbol: symbol.to_string(),
            order_id,
        })?;
        self.open_orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| Order {
                status: OrderStatus::Cancelled,
                ..o.clone()
            })
            .ok_or_else(|| ExchangeError::Api {
                status: 400,
                label: "ORDER_NOT_FOUND".to_string(),
                message: format!("Order {order_id} not found"),
            })
    }

    async fn get_trades(
        &self,
        _cancel: &CancellationToken,
        symbol: &str,
        order_id: Option<u64>,
    ) -> Result<Vec<Trade>, ExchangeError> {
        self.record(Call::GetTrades {
            symbol: symbol.to_string(),
            order_id,
        })?;
        Ok(self
            .trades
            .iter()
            .filter(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .filter(|t| order_id.map_or(true, |id| t.order_id == id))
            .cloned()
            .collect())
    }
}
