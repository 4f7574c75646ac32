mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use objreg_client::{logging, ClientConfig, LivenessMonitor, RegistryClient, Session};

#[derive(Debug, Parser)]
#[command(
    name = "objreg",
    about = "Resilient client for the replicated object registry"
)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "OBJREG_CONFIG")]
    config: Option<PathBuf>,

    /// Override the registered object name
    #[arg(long, env = "OBJREG_NAME")]
    name: Option<String>,

    /// Override the advertised object address
    #[arg(long, env = "OBJREG_ADDRESS")]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(name) = args.name {
        config.identity.name = name;
    }
    if let Some(address) = args.address {
        config.identity.address = address;
    }

    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        anyhow::bail!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        );
    }

    logging::init_logging(&config.logging)?;
    info!(
        name = %config.identity.name,
        business = ?config.registry.business_addresses,
        ping = ?config.registry.ping_addresses,
        "objreg client starting"
    );

    let client = Arc::new(RegistryClient::connect(&config)?);
    let session = Arc::new(Session::new(config.identity.clone()));

    // Non-fatal: the user can press 'r' once a replica comes up.
    match client.register(session.identity()).await {
        Ok(endpoint) => session.mark_registered(&endpoint),
        Err(e) => warn!(error = %e, "initial registration failed; press 'r' to retry"),
    }

    let monitor = LivenessMonitor::new(
        client.clone(),
        session.clone(),
        config.heartbeat.tick_interval(),
    );
    let monitor_handle = monitor.start();

    commands::run(client.clone(), session.clone()).await?;

    // Exit path: stop the monitor first so it cannot re-register
    // behind our back, then one best-effort deregister.
    monitor.shutdown();
    let _ = monitor_handle.await;
    if session.is_alive() {
        if let Err(e) = client.deregister(session.name()).await {
            warn!(error = %e, "final deregister failed; server TTL will expire the entry");
        }
    }

    info!("objreg client stopped");
    Ok(())
}
