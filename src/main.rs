use anyhow::Result;
use pharos_gate::{
    app::build_router,
    config::Config,
    services::{HttpRpcClient, PaymentVerifier},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting pharos-gate v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    // Initialize services
    let resolver = Arc::new(config.resolver());
    let verifier = Arc::new(
        PaymentVerifier::new(Arc::new(HttpRpcClient::new())).with_polling(config.polling),
    );

    let app = build_router(verifier, resolver, config.price.clone());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!(
        "Default network: {} (rpc: {}, recipient: {})",
        config.payments.network,
        config.payments.rpc_url,
        config.payments.recipient
    );
    tracing::info!("Paid endpoint: http://{}/api/paid/receipt ({} native)", addr, config.price);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
