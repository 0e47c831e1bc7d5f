use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskboard_realtime::api::router;
use taskboard_realtime::config::{AppConfig, LogFormat};
use taskboard_realtime::state::AppContext;
use taskboard_realtime::workers::run_bus_monitor;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    info!("Starting taskboard realtime service");

    let http_addr = config.http_addr;
    let monitor_interval = config.monitor_interval;
    let context = AppContext::new(config);
    info!(
        "Application context initialized (mailbox capacity {})",
        context.event_bus.mailbox_capacity()
    );

    // Start bus monitor
    let monitor = monitor_interval.map(|period| {
        let bus = context.event_bus.clone();
        tokio::spawn(async move {
            if let Err(e) = run_bus_monitor(bus, period).await {
                error!("Bus monitor error: {}", e);
            }
        })
    });

    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;
    info!("API server listening on {}", http_addr);

    let bus = context.event_bus.clone();
    axum::serve(listener, router(context))
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Received shutdown signal");
            // Ends every open event stream so in-flight connections can drain
            bus.shutdown();
        })
        .await
        .context("API server failed")?;

    if let Some(monitor) = monitor {
        monitor.abort();
    }

    info!("Shutting down...");
    Ok(())
}
