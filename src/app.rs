use crate::{
    handlers::*,
    middleware::{x402_middleware_layer, X402Middleware},
    services::{NetworkResolver, PaymentVerifier},
};
use axum::{
    extract::Request,
    middleware::{self as axum_middleware, Next},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Builds the HTTP surface around a verifier.
///
/// `price` is what `/api/paid/receipt` costs, in the network's native coin.
pub fn build_router(
    verifier: Arc<PaymentVerifier>,
    resolver: Arc<NetworkResolver>,
    price: impl Into<String>,
) -> Router {
    let x402 = Arc::new(X402Middleware::new(
        verifier.clone(),
        resolver.clone(),
        price,
    ));

    let app_state = AppState {
        verifier: verifier.clone(),
        resolver: resolver.clone(),
    };

    let health_state = HealthState {
        transport: verifier.transport().clone(),
        resolver,
        started_at: Instant::now(),
    };

    Router::new()
        // Public endpoints (no payment required)
        .route("/health", get(health_check))
        .with_state(health_state)

        .route("/api/payments/verify", post(verify_payment))
        .with_state(app_state)

        // Protected endpoints (payment required)
        .route(
            "/api/paid/receipt",
            get(paid_receipt)
                .layer(axum_middleware::from_fn(move |req: Request, next: Next| {
                    let x402 = x402.clone();
                    async move { x402_middleware_layer(x402, req, next).await }
                })),
        )

        // Global middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
