//! Chronobond service.
//!
//! ```text
//!     Browser ──HTTP/WS──▶ http ──▶ workflow ──▶ transaction (status boards)
//!                           │          │                │
//!                           │          ▼                ▼
//!                           │       chain ──▶ wallet    EventBus ──▶ /ws
//!                           │          │      bridge
//!                           ▼          ▼
//!                        quoting     cache
//!                           │
//!                           ▼
//!                      swap backend
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use chronobond::chain::HttpChainGateway;
use chronobond::config::load_from_env;
use chronobond::notices::Notices;
use chronobond::observability::{logging::init_tracing, metrics::init_metrics};
use chronobond::quoting::QuoteClient;
use chronobond::transaction::EventBus;
use chronobond::{HttpServer, Shutdown, Workflows};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;
    init_tracing(&config.observability);

    tracing::info!("chronobond v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        bridge_url = %config.chain.bridge_url,
        failover_urls = config.chain.failover_urls.len(),
        quotes_enabled = config.swap.base_url.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let gateway = Arc::new(HttpChainGateway::new(&config.chain)?);
    let notices = Notices::new(
        config.server.event_buffer,
        Duration::from_millis(config.swap.notice_ttl_ms),
    );
    let quotes = QuoteClient::new(&config.swap, notices.clone());
    let events = EventBus::new(config.server.event_buffer);
    let workflows = Workflows::new(gateway, quotes, events, config.swap.default_slippage_bps);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();

    let server = HttpServer::new(config, workflows, notices);
    let signal = shutdown.clone();
    server.run(listener, async move { signal.signalled().await }).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
