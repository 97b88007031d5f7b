use async_trait::async_trait;
use gatecmd_exchange::{ExchangeClient, ExchangeError};
use gatecmd_models::{BalanceRecord, PortfolioValuation, PriceSource, ValuedBalance};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::AgentError;

/// Last-price source used during valuation.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn last_price(&self, symbol: &str) -> Result<Decimal, ExchangeError>;
}

/// Prices straight from an exchange client, bound to one cancellation token.
pub struct ClientPriceLookup<'a, C: ExchangeClient + ?Sized> {
    client: &'a C,
    cancel: &'a CancellationToken,
}

impl<'a, C: ExchangeClient + ?Sized> ClientPriceLookup<'a, C> {
    pub fn new(client: &'a C, cancel: &'a CancellationToken) -> Self {
        Self { client, cancel }
    }
}

#[async_trait]
impl<'a, C: ExchangeClient + ?Sized> PriceLookup for ClientPriceLookup<'a, C> {
    async fn last_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        self.client.get_last_price(self.cancel, symbol).await
    }
}

/// Value every balance in `quote_currency`.
///
/// The quote currency itself is priced at 1 without a lookup. Any other
/// currency is priced from `{currency}_{quote}`; when that lookup fails the
/// balance is still included at a unit price of 1 and marked as a fallback.
/// Output order matches input order, and `total` is the sum of every
/// `sum_value`. A value outside the `Decimal` range fails the whole pass
/// with `ValuationOverflow` instead of panicking.
pub async fn valuate<P: PriceLookup + ?Sized>(
    balances: &[BalanceRecord],
    quote_currency: &str,
    prices: &P,
) -> Result<PortfolioValuation, AgentError> {
    let quote = quote_currency.to_lowercase();
    let mut valued = Vec::with_capacity(balances.len());
    let mut total = Decimal::ZERO;

    for record in balances {
        let currency = record.currency.to_lowercase();
        let (unit_price, source) = if currency == quote {
            (Decimal::ONE, PriceSource::Quote)
        } else {
            let symbol = format!("{currency}_{quote}");
            match prices.last_price(&symbol).await {
                Ok(price) => {
                    debug!(symbol = %symbol, price = %price, "Last price");
                    (price, PriceSource::Market)
                }
                Err(e) => {
                    warn!(
                        currency = %record.currency,
                        symbol = %symbol,
                        error = %e,
                        "Price lookup failed, valuing at 1"
                    );
                    (Decimal::ONE, PriceSource::Fallback)
                }
            }
        };

        let overflow = || {
            error!(currency = %record.currency, unit_price = %unit_price, "Valuation overflow");
            AgentError::ValuationOverflow {
                currency: record.currency.clone(),
            }
        };
        let balance = ValuedBalance::from_record(record, unit_price, source).ok_or_else(overflow)?;
        total = total.checked_add(balance.sum_value).ok_or_else(overflow)?;
        valued.push(balance);
    }

    Ok(PortfolioValuation {
        quote_currency: quote,
        balances: valued,
        total,
    })
}
