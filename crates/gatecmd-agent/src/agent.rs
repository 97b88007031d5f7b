use std::time::Duration;

use gatecmd_exchange::{ExchangeClient, GateSpotV4};
use gatecmd_models::{GateCmdConfig, Order, OrderRequest, OrderResult, PortfolioValuation, Trade};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::dispatcher::OrderDispatcher;
use crate::display::{format_total, format_valued_balance, to_pretty_json};
use crate::error::AgentError;
use crate::logging::Logger;
use crate::valuator::{valuate, ClientPriceLookup};

/// One exchange session: a logger, a client and the quote currency used
/// for valuation. Every user-facing operation goes through here.
pub struct Agent<C: ExchangeClient> {
    logger: Logger,
    client: C,
    quote_currency: String,
}

impl Agent<GateSpotV4> {
    /// Start the logger first so client construction failures are recorded.
    pub fn init(config: &GateCmdConfig) -> Result<Self, AgentError> {
        let logger = Logger::init(&config.log)?;
        let exchange = &config.exchange;

        let client = GateSpotV4::new(
            &exchange.key,
            &exchange.secret,
            &exchange.host,
            Duration::from_secs(exchange.timeout_seconds),
        )
        .map_err(|e| {
            error!(host = %exchange.host, error = %e, "Failed to create exchange client");
            AgentError::Client(e.to_string())
        })?;
        info!(host = %client.host(), quote = %exchange.quote_currency, "Exchange client ready");

        Ok(Self::with_client(logger, client, &exchange.quote_currency))
    }
}

impl<C: ExchangeClient> Agent<C> {
    pub fn with_client(logger: Logger, client: C, quote_currency: &str) -> Self {
        Self {
            logger,
            client,
            quote_currency: quote_currency.to_lowercase(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Value every spot balance in the configured quote currency.
    pub async fn balance(&self, cancel: &CancellationToken) -> Result<PortfolioValuation, AgentError> {
        self.balance_in(cancel, &self.quote_currency).await
    }

    pub async fn balance_in(
        &self,
        cancel: &CancellationToken,
        quote_currency: &str,
    ) -> Result<PortfolioValuation, AgentError> {
        let balances = self.client.get_balances(cancel).await.map_err(|e| {
            error!(error = %e, "Get balances failed");
            AgentError::exchange("get balances", e)
        })?;

        let lookup = ClientPriceLookup::new(&self.client, cancel);
        let valuation = valuate(&balances, quote_currency, &lookup).await?;

        for balance in &valuation.balances {
            info!("{}", format_valued_balance(balance, &valuation.quote_currency));
        }
        info!("{}", format_total(valuation.total));
        Ok(valuation)
    }

    /// Open orders for `symbol`, or across every pair when `symbol` is empty.
    pub async fn list_orders(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
    ) -> Result<Vec<Order>, AgentError> {
        let orders = self
            .client
            .list_open_orders(cancel, symbol)
            .await
            .map_err(|e| {
                error!(symbol, error = %e, "List open orders failed");
                AgentError::exchange("list open orders", e)
            })?;

        info!(symbol, count = orders.len(), "Open orders");
        for order in &orders {
            log_json(order.id, order);
        }
        Ok(orders)
    }

    pub async fn place_order(
        &self,
        cancel: &CancellationToken,
        request: &OrderRequest,
    ) -> Result<OrderResult, AgentError> {
        OrderDispatcher::new(&self.client)
            .place_order(cancel, request)
            .await
    }

    /// Cancel by exchange order id. The id must be a positive integer.
    pub async fn cancel_order(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
        order_id: &str,
    ) -> Result<Order, AgentError> {
        info!(symbol, order_id, "Cancelling order");
        let id = parse_order_id(order_id).inspect_err(|e| {
            error!(symbol, order_id, error = %e, "Cancel order failed");
        })?;

        let order = self
            .client
            .cancel_order(cancel, symbol, id)
            .await
            .map_err(|e| {
                error!(symbol, order_id = id, error = %e, "Cancel order failed");
                AgentError::exchange("cancel order", e)
            })?;
        info!(symbol, order_id = id, status = ?order.status, "Order cancelled");
        Ok(order)
    }

    /// Trade history for `symbol`, optionally narrowed to one order.
    pub async fn tx_history(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
        order_id: Option<&str>,
    ) -> Result<Vec<Trade>, AgentError> {
        let id = match order_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_order_id(raw).inspect_err(|e| {
                error!(symbol, order_id = raw, error = %e, "Get trades failed");
            })?),
            None => None,
        };

        let trades = self
            .client
            .get_trades(cancel, symbol, id)
            .await
            .map_err(|e| {
                error!(symbol, order_id = ?id, error = %e, "Get trades failed");
                AgentError::exchange("get trades", e)
            })?;

        info!(symbol, order_id = ?id, count = trades.len(), "Trades");
        for trade in &trades {
            log_json(trade.id, trade);
        }
        Ok(trades)
    }

    /// Flush and release the logger. Consumes the agent.
    pub fn close(self) {
        info!("Closing agent");
        self.logger.close();
    }
}

pub fn parse_order_id(raw: &str) -> Result<u64, AgentError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AgentError::InvalidOrderId(raw.to_string())),
    }
}

/// Serialization failures are logged and skipped; they never fail the operation.
fn log_json<T: serde::Serialize>(id: u64, value: &T) {
    match to_pretty_json(value) {
        Ok(json) => info!(id, "{json}"),
        Err(e) => error!(id, error = %e, "Failed to render as JSON"),
    }
}
