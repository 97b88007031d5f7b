use std::str::FromStr;

use gatecmd_exchange::ExchangeClient;
use gatecmd_models::{OrderRequest, OrderResult, OrderType, Side};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::AgentError;

/// A request that passed local validation, with every number parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderIntent {
    Limit {
        side: Side,
        price: Decimal,
        amount: Decimal,
    },
    /// Spend `total` of the quote currency.
    MarketBuy { total: Decimal },
    /// Sell `amount` of the base currency.
    MarketSell { amount: Decimal },
}

impl OrderIntent {
    /// Validate a raw request: type, then side, then only the numeric
    /// fields the matched branch uses.
    pub fn from_request(request: &OrderRequest) -> Result<Self, AgentError> {
        let order_type = OrderType::from_str(&request.order_type)
            .map_err(|_| AgentError::InvalidOrderType(request.order_type.clone()))?;
        let side = Side::from_str(&request.side)
            .map_err(|_| AgentError::InvalidSide(request.side.clone()))?;

        match (order_type, side) {
            (OrderType::Limit, side) => Ok(OrderIntent::Limit {
                side,
                price: parse_amount("price", request.price.as_deref())?,
                amount: parse_amount("amount", request.amount.as_deref())?,
            }),
            (OrderType::Market, Side::Buy) => Ok(OrderIntent::MarketBuy {
                total: parse_amount("total", request.total.as_deref())?,
            }),
            (OrderType::Market, Side::Sell) => Ok(OrderIntent::MarketSell {
                amount: parse_amount("amount", request.amount.as_deref())?,
            }),
        }
    }
}

/// Parse a user-supplied order quantity. Missing, malformed, zero and
/// negative values are all rejected; nothing ever defaults to zero.
pub fn parse_amount(field: &'static str, value: Option<&str>) -> Result<Decimal, AgentError> {
    let raw = value.unwrap_or_default();
    let invalid = || AgentError::InvalidAmount {
        field,
        value: raw.to_string(),
    };
    let parsed = Decimal::from_str(raw.trim()).map_err(|_| invalid())?;
    if parsed <= Decimal::ZERO {
        return Err(invalid());
    }
    Ok(parsed)
}

/// Maps an order request onto exactly one exchange placement.
pub struct OrderDispatcher<'a, C: ExchangeClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: ExchangeClient + ?Sized> OrderDispatcher<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn place_order(
        &self,
        cancel: &CancellationToken,
        request: &OrderRequest,
    ) -> Result<OrderResult, AgentError> {
        info!(
            symbol = %request.symbol,
            client_id = %request.client_id,
            side = %request.side,
            order_type = %request.order_type,
            price = ?request.price,
            amount = ?request.amount,
            total = ?request.total,
            "Placing order"
        );

        let result = self.dispatch(cancel, request).await;
        match &result {
            Ok(placed) => info!(order_id = placed.id, symbol = %request.symbol, "Order placed"),
            Err(e) => error!(symbol = %request.symbol, error = %e, "Place order failed"),
        }
        result
    }

    async fn dispatch(
        &self,
        cancel: &CancellationToken,
        request: &OrderRequest,
    ) -> Result<OrderResult, AgentError> {
        let intent = OrderIntent::from_request(request)?;
        let symbol = request.symbol.as_str();
        let client_id = request.client_id.as_str();

        match intent {
            OrderIntent::Limit {
                side,
                price,
                amount,
            } => self
                .client
                .place_limit_order(cancel, symbol, client_id, side, price, amount)
                .await
                .map_err(|e| AgentError::exchange("place limit order", e)),
            OrderIntent::MarketBuy { total } => {
                self.place_market(cancel, symbol, client_id, Side::Buy, total)
                    .await
            }
            OrderIntent::MarketSell { amount } => {
                self.place_market(cancel, symbol, client_id, Side::Sell, amount)
                    .await
            }
        }
    }

    /// Resolve the pair, then place. Placement is never attempted when
    /// resolution fails.
    async fn place_market(
        &self,
        cancel: &CancellationToken,
        symbol: &str,
        client_id: &str,
        side: Side,
        amount_or_total: Decimal,
    ) -> Result<OrderResult, AgentError> {
        let pair = self
            .client
            .resolve_symbol(cancel, symbol)
            .await
            .map_err(|source| AgentError::UnknownSymbol {
                symbol: symbol.to_string(),
                source,
            })?;
        debug!(symbol, pair = %pair.id, "Resolved symbol");

        self.client
            .place_market_order(cancel, &pair, client_id, side, amount_or_total)
            .await
            .map_err(|e| AgentError::exchange("place market order", e))
    }
}
