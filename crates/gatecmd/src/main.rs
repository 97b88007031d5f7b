use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use gatecmd::agent::Agent;
use gatecmd::models::GateCmdConfig;
use gatecmd::Cli;

// The logger installs a thread-scoped subscriber, so everything stays on one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = GateCmdConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config))?;

    let agent = Agent::init(&config).context("Failed to initialize agent")?;

    let cancel = CancellationToken::new();
    if let Err(e) = gatecmd::spawn_shutdown_listener(cancel.clone()) {
        tracing::warn!(error = %e, "Failed to install signal handlers");
    }

    let result = gatecmd::run_command(&agent, &cancel, &cli.command).await;
    agent.close();

    let output = result.map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("{output}");

    Ok(())
}
