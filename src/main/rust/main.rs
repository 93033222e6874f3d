use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::oneshot;
use tracing::info;
use warp::Filter;

use camera_wake_bridge::{
    routes, BridgeMode, Config, FfmpegRelayLauncher, HttpCloudClient, PrometheusReporter,
    SessionOrchestrator, SessionRegistry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();
    config.validate()?;

    // Initialize logging
    let filter = if config.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    // Initialize metrics
    PrometheusReporter::init_metrics()?;

    info!("Starting camera wake bridge");
    info!("  Cloud API: {}", config.api_base_url);
    info!("  Mode: {}", config.mode);
    info!("  HTTP port: {}", config.http_port);

    // Convert CLI config to domain configs
    let endpoint = config
        .to_cloud_endpoint()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let settings = config
        .to_orchestrator_settings()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    // Create infrastructure implementations (dependency injection)
    let cloud = Arc::new(HttpCloudClient::new(endpoint)?);
    let registry = Arc::new(SessionRegistry::default());
    let metrics_reporter = Arc::new(PrometheusReporter::new());

    let mut orchestrator = SessionOrchestrator::new(cloud, registry, metrics_reporter, settings);
    if config.mode == BridgeMode::Relay {
        let relay_settings = config
            .to_relay_settings()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        info!(
            "  Relay ports: {:?} via {}",
            relay_settings.ports(),
            relay_settings.ffmpeg_path().display()
        );
        let launcher = Arc::new(FfmpegRelayLauncher::new(relay_settings.clone()));
        orchestrator = orchestrator.with_relay(launcher, &relay_settings);
    }
    let orchestrator = Arc::new(orchestrator);

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => tracing::error!("Failed to listen for ctrl+c: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    // CORS configuration for browser access
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "DELETE", "OPTIONS"])
        .allow_headers(vec!["Content-Type", "Authorization"]);

    let api = routes(orchestrator.clone()).with(cors);

    let (addr, server) = warp::serve(api).try_bind_with_graceful_shutdown(
        ([0, 0, 0, 0], config.http_port),
        async {
            shutdown_rx.await.ok();
        },
    )?;

    info!("HTTP API listening on http://{}", addr);
    server.await;

    // Stop every relay before exiting
    orchestrator.shutdown().await;

    info!("Bridge shutdown complete");
    Ok(())
}
