//! gatecmd - command-line trading agent for the Gate.io spot market.
//!
//! Values spot balances in a quote currency, places limit and market
//! orders, lists and cancels open orders and shows trade history.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use gatecmd::agent::{Agent, AgentError};
//! use gatecmd::exchange::{ExchangeClient, GateSpotV4};
//! use gatecmd::models::{GateCmdConfig, OrderRequest};
//! ```

pub use gatecmd_agent as agent;
pub use gatecmd_exchange as exchange;
pub use gatecmd_models as models;

pub mod cli;

pub use cli::{Cli, Command, OrderCommand, PlaceArgs};

use gatecmd_agent::display::{format_valuation, to_pretty_json};
use gatecmd_agent::{Agent, AgentError};
use gatecmd_exchange::ExchangeClient;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancel `cancel` on ctrl-c, or on SIGTERM where the platform has it.
///
/// The SIGTERM hook is installed before this returns, so a registration
/// failure is reported here and the token is left alone.
pub fn spawn_shutdown_listener(cancel: CancellationToken) -> std::io::Result<JoinHandle<()>> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let interrupt = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        };
        #[cfg(unix)]
        let terminated = async {
            terminate.recv().await;
        };
        #[cfg(not(unix))]
        let terminated = std::future::pending::<()>();

        tokio::select! {
            _ = interrupt => {}
            _ = terminated => {}
        }
        info!("Received shutdown signal");
        cancel.cancel();
    }))
}

/// Execute one command and return what should be printed on stdout.
pub async fn run_command<C: ExchangeClient>(
    agent: &Agent<C>,
    cancel: &CancellationToken,
    command: &Command,
) -> Result<String, AgentError> {
    match command {
        Command::Balance { quote } => {
            let valuation = match quote {
                Some(quote) => agent.balance_in(cancel, quote).await?,
                None => agent.balance(cancel).await?,
            };
            Ok(format_valuation(&valuation))
        }
        Command::Order { action } => match action {
            OrderCommand::List { symbol } => {
                let orders = agent.list_orders(cancel, symbol).await?;
                to_pretty_json(&orders)
            }
            OrderCommand::Place(args) => {
                let placed = agent.place_order(cancel, &args.to_request()).await?;
                Ok(format!("order id is {}", placed.id))
            }
            OrderCommand::Cancel { symbol, order } => {
                let cancelled = agent.cancel_order(cancel, symbol, order).await?;
                Ok(format!("order {} is cancelled", cancelled.id))
            }
        },
        Command::Tx { symbol, order } => {
            let trades = agent.tx_history(cancel, symbol, order.as_deref()).await?;
            to_pretty_json(&trades)
        }
    }
}
