use anyhow::Context;
use marketplace_orders::config::AppConfig;
use marketplace_orders::gateway::SandboxGateway;
use marketplace_orders::http;
use marketplace_orders::lifecycle::tracing::setup_tracing;
use marketplace_orders::lifecycle::{seed_demo, MarketplaceSystem};
use marketplace_orders::notify::LogNotifier;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(?config, "Starting marketplace orders service");

    warn!("Refunds go to the sandbox gateway; no money moves");
    let system = MarketplaceSystem::start(
        &config,
        Arc::new(SandboxGateway::new()),
        Arc::new(LogNotifier),
    );

    if config.seed_demo {
        let demo = seed_demo(&system).await.context("seeding demo data")?;
        info!(
            admin = %demo.admin,
            vendor_staff = %demo.vendor_staff,
            customer = %demo.customer,
            order = %demo.order,
            "Demo users ready; send their id in x-user-id"
        );
    }
    if config.cron_secret.is_none() {
        warn!("MARKETPLACE_CRON_SECRET is not set; cron endpoints will reject every call");
    }

    let app = http::router(system.app_state(), &config.cors, config.request_timeout);
    let listener = TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("binding {}", config.http_addr))?;
    info!(addr = %config.http_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    system.shutdown(SHUTDOWN_GRACE).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Listening for Ctrl-C failed");
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, draining requests");
}
