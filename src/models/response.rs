use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub network: String,
    pub rpc_reachable: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Body returned by the gated endpoint once payment has cleared.
#[derive(Serialize, Deserialize, Debug)]
pub struct PaidResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}
