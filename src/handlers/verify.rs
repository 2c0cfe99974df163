use crate::{
    models::{VerificationRequest, Verdict, VerdictCode},
    services::{network::NETWORK_HEADER, NetworkResolver, PaymentVerifier},
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<PaymentVerifier>,
    pub resolver: Arc<NetworkResolver>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentBody {
    #[serde(flatten)]
    pub request: VerificationRequest,
    #[serde(default)]
    pub network: Option<String>,
    // Legacy callers still send these; they play no part in verification
    #[serde(default)]
    pub mint: Option<Value>,
    #[serde(default)]
    pub memo: Option<Value>,
}

pub async fn verify_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<VerifyPaymentBody>,
) -> (StatusCode, Json<Verdict>) {
    let network_header = headers.get(NETWORK_HEADER).and_then(|h| h.to_str().ok());
    let config = state
        .resolver
        .resolve_request(network_header, body.network.as_deref());

    if body.mint.is_some() || body.memo.is_some() {
        tracing::debug!("Ignoring legacy mint/memo fields");
    }

    let verdict = state.verifier.verify(&config, &body.request).await;

    let status = match verdict.code() {
        VerdictCode::Ok => StatusCode::OK,
        VerdictCode::VerificationError => StatusCode::BAD_GATEWAY,
        _ => StatusCode::PAYMENT_REQUIRED,
    };

    (status, Json(verdict))
}
