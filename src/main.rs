//! Subscription gate server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ TraceLayer ─▶ TimeoutLayer ─▶ subscription gate ─┬─▶ view
//!                                                        │             │
//!                                   exemptions ◀─────────┤             └─▶ 302 subscribe
//!                                   (route rules, globs) │                 302 login?next=
//!                                                        ▼
//!                                   subscriber resolver + subscription cache
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use subscription_gate::billing::{resolver_from_config, SubscriptionCache};
use subscription_gate::config::{load_config, GateConfig};
use subscription_gate::observability::{logging, metrics};
use subscription_gate::HttpServer;

#[derive(Parser)]
#[command(name = "subscription-gate")]
#[command(about = "Serve views behind a subscription check", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force debug mode on (exempts the debug toolbar).
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };
    if cli.debug {
        config.gate.debug = true;
    }

    logging::init_logging(&config.observability);
    tracing::info!("subscription-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        exempt_rules = config.gate.exempt_urls.len(),
        debug = config.gate.debug,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let cache = match &config.subscriptions.persistence_path {
        Some(path) => SubscriptionCache::load_from_file(path, config.subscriptions.grace_period_secs)?,
        None => SubscriptionCache::new(None, config.subscriptions.grace_period_secs),
    };
    let subscribers = Arc::from(resolver_from_config(&config.subscriber));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, subscribers, Arc::new(cache.clone()))?;
    server.run(listener).await?;

    cache.save_to_file()?;
    tracing::info!("Shutdown complete");
    Ok(())
}
