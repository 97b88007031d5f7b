use clap::{Args, Parser, Subcommand};
use gatecmd_models::OrderRequest;

#[derive(Parser, Debug)]
#[command(name = "gatecmd", about = "Command-line trading agent for the Gate.io spot market")]
pub struct Cli {
    /// Path to configuration file (.toml or .json)
    #[arg(short, long, default_value = "config/gatecmd.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show every spot balance valued in the quote currency
    Balance {
        /// Quote currency to value in, overriding the config. Currencies
        /// with no pair against it, including the configured quote currency
        /// itself, are valued at 1.
        #[arg(short, long)]
        quote: Option<String>,
    },

    /// List, place or cancel orders
    Order {
        #[command(subcommand)]
        action: OrderCommand,
    },

    /// Show trade history for a pair
    Tx {
        /// Currency pair, e.g. btc_usdt
        #[arg(short, long)]
        symbol: String,

        /// Only trades filled by this order
        #[arg(short, long)]
        order: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum OrderCommand {
    /// List open orders; every pair when no symbol is given
    List {
        #[arg(short, long, default_value = "")]
        symbol: String,
    },

    /// Place a limit or market order
    Place(PlaceArgs),

    /// Cancel an open order
    Cancel {
        #[arg(short, long)]
        symbol: String,

        /// Exchange order id
        #[arg(short, long)]
        order: String,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PlaceArgs {
    #[arg(short, long)]
    pub symbol: String,

    /// Caller reference attached to the order
    #[arg(short = 'i', long = "client-id", default_value = "")]
    pub client_id: String,

    /// buy or sell
    #[arg(short = 'd', long)]
    pub side: String,

    /// limit or market
    #[arg(short = 't', long = "type")]
    pub order_type: String,

    /// Limit price
    #[arg(short, long)]
    pub price: Option<String>,

    /// Base amount (limit orders and market sells)
    #[arg(short = 'm', long)]
    pub amount: Option<String>,

    /// Quote amount to spend (market buys)
    #[arg(short = 'a', long)]
    pub total: Option<String>,
}

impl PlaceArgs {
    pub fn to_request(&self) -> OrderRequest {
        OrderRequest {
            symbol: self.symbol.clone(),
            client_id: self.client_id.clone(),
            side: self.side.clone(),
            order_type: self.order_type.clone(),
            price: self.price.clone(),
            amount: self.amount.clone(),
            total: self.total.clone(),
        }
    }
}
