use crate::error::{GateError, PaymentInstructions};
use crate::models::{VerificationRequest, Verdict};
use crate::services::{network::NETWORK_HEADER, NetworkResolver, PaymentVerifier};
use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::Arc;

pub const PAYMENT_HEADER: &str = "x-payment";
pub const PAYER_HEADER: &str = "x-payer";

/// Gate that releases a request only once its `X-Payment` transaction has
/// been verified on chain for at least `price`.
#[derive(Clone)]
pub struct X402Middleware {
    verifier: Arc<PaymentVerifier>,
    resolver: Arc<NetworkResolver>,
    price: String,
}

impl X402Middleware {
    pub fn new(
        verifier: Arc<PaymentVerifier>,
        resolver: Arc<NetworkResolver>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            verifier,
            resolver,
            price: price.into(),
        }
    }

    pub async fn verify_payment_header(
        &self,
        payment_header: Option<&str>,
        network_header: Option<&str>,
        payer_header: Option<&str>,
    ) -> Result<Verdict, GateError> {
        let config = self.resolver.resolve(network_header);

        let Some(tx_hash) = payment_header.map(str::trim).filter(|h| !h.is_empty()) else {
            return Err(GateError::PaymentRequired(Box::new(
                PaymentInstructions::for_config(&config, &self.price),
            )));
        };

        let mut request = VerificationRequest::new(tx_hash, self.price.as_str());
        if let Some(payer) = payer_header {
            request = request.with_expected_wallet(payer);
        }

        let verdict = self.verifier.verify(&config, &request).await;

        if !verdict.is_ok() {
            return Err(GateError::PaymentRejected(Box::new(verdict)));
        }

        Ok(verdict)
    }
}

fn header_value(request: &Request, name: &str) -> Result<Option<String>, GateError> {
    request
        .headers()
        .get(name)
        .map(|h| {
            h.to_str()
                .map(str::to_string)
                .map_err(|_| GateError::InvalidPaymentProof(format!("{} header is not valid text", name)))
        })
        .transpose()
}

// Axum middleware function
pub async fn x402_middleware_layer(
    middleware: Arc<X402Middleware>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let payment = header_value(&request, PAYMENT_HEADER)?;
    let network = header_value(&request, NETWORK_HEADER)?;
    let payer = header_value(&request, PAYER_HEADER)?;

    let verdict = middleware
        .verify_payment_header(payment.as_deref(), network.as_deref(), payer.as_deref())
        .await?;

    // Handlers can read the settled payment from the extensions
    request.extensions_mut().insert(verdict);

    Ok(next.run(request).await)
}
