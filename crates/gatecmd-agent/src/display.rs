//! Human-readable renderings shared by the agent logs and the CLI output.

use gatecmd_models::{PortfolioValuation, ValuedBalance};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AgentError;

const RULE: &str = "---------------------------------";

/// Four-line table for one currency: header, available, locked, sum.
pub fn format_valued_balance(balance: &ValuedBalance, quote_currency: &str) -> String {
    format!(
        "{}\t\tAmount\tValue({})\n\tAvailable\t{}\t{}\n\tLocked   \t{}\t{}\n\tSum      \t{}\t{}",
        balance.currency,
        quote_currency.to_uppercase(),
        balance.available_amount,
        balance.available_value,
        balance.locked_amount,
        balance.locked_value,
        balance.sum_amount,
        balance.sum_value,
    )
}

pub fn format_total(total: Decimal) -> String {
    format!("{RULE}\nAll: {total}")
}

/// Every currency table followed by the grand total.
pub fn format_valuation(valuation: &PortfolioValuation) -> String {
    let mut out: Vec<String> = valuation
        .balances
        .iter()
        .map(|b| format_valued_balance(b, &valuation.quote_currency))
        .collect();
    out.push(format_total(valuation.total));
    out.join("\n")
}

pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AgentError> {
    Ok(serde_json::to_string_pretty(value)?)
}
