use crate::{
    models::HealthStatus,
    services::{NetworkResolver, RpcTransport},
};
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct HealthState {
    pub transport: Arc<dyn RpcTransport>,
    pub resolver: Arc<NetworkResolver>,
    pub started_at: Instant,
}

pub async fn health_check(
    State(state): State<HealthState>,
) -> Json<HealthStatus> {
    let config = state.resolver.resolve(None);

    let rpc_reachable = match state.transport.block_number(&config.rpc_url).await {
        Ok(height) => {
            tracing::debug!("RPC reachable, current block: {}", height);
            true
        }
        Err(e) => {
            tracing::warn!("RPC health probe failed: {}", e);
            false
        }
    };

    Json(HealthStatus {
        status: if rpc_reachable { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        network: config.network,
        rpc_reachable,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
