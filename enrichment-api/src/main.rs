mod config;
mod handlers;
mod state;
mod wiring;

use axum::Router;
use envconfig::Envconfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env()?;

    PrometheusBuilder::new()
        .install()
        .expect("failed to install prometheus metrics exporter");

    let state = wiring::build_state(&config).await;
    let app = handlers::app::add_routes(Router::new(), state);

    let address = format!("{}:{}", config.bind_host, config.bind_port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(%address, "enrichment api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Waits for SIGINT or (on Unix) SIGTERM so in-flight requests get a chance
/// to finish before the listener drops.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
