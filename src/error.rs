use crate::models::{PaymentConfig, TokenType, Verdict, VerdictCode};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Payment required: {} {}", .0.payment.amount, .0.payment.asset)]
    PaymentRequired(Box<PaymentInstructions>),

    #[error("Payment verification failed: {}", .0.message())]
    PaymentRejected(Box<Verdict>),

    #[error("Invalid payment proof: {0}")]
    InvalidPaymentProof(String),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_instructions: Option<PaymentInstructions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

/// What a caller must do to unlock a gated endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentInstructions {
    #[serde(rename = "type")]
    pub type_: String,
    pub version: String,
    pub payment: PaymentDetails,
    pub instructions: PaymentFormat,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentDetails {
    pub network: String,
    pub asset: String,
    pub token_type: TokenType,
    pub amount: String,
    pub decimals: u32,
    pub recipient: String,
    pub explorer: String,
    pub expires_in_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentFormat {
    pub header: String,
    pub format: String,
    pub network_header: String,
}

impl PaymentInstructions {
    pub fn for_config(config: &PaymentConfig, amount: &str) -> Self {
        PaymentInstructions {
            type_: "x402.payment_required".to_string(),
            version: "1.0.0".to_string(),
            payment: PaymentDetails {
                network: config.network.clone(),
                asset: "native".to_string(),
                token_type: config.token_type,
                amount: amount.to_string(),
                decimals: config.decimals,
                recipient: config.recipient.clone(),
                explorer: config.explorer_base_url.clone(),
                expires_in_seconds: config.expires_in_seconds,
                payment_url: config.payment_url.clone(),
            },
            instructions: PaymentFormat {
                header: "X-Payment".to_string(),
                format: "transaction_hash".to_string(),
                network_header: crate::services::network::NETWORK_HEADER.to_string(),
            },
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();

        let (status, error_code, payment_instructions, explorer_url) = match &self {
            GateError::PaymentRequired(instructions) => (
                StatusCode::PAYMENT_REQUIRED,
                "PAYMENT_REQUIRED",
                Some(instructions.as_ref().clone()),
                None,
            ),
            GateError::PaymentRejected(verdict) => {
                let status = if verdict.code() == VerdictCode::VerificationError {
                    StatusCode::BAD_GATEWAY
                } else {
                    StatusCode::PAYMENT_REQUIRED
                };
                (
                    status,
                    "PAYMENT_VERIFICATION_FAILED",
                    None,
                    Some(verdict.explorer_url().to_string()),
                )
            }
            GateError::InvalidPaymentProof(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_PAYMENT_PROOF", None, None)
            }
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
            payment_instructions,
            explorer_url,
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, error_code = error_code, "Request failed");
        } else {
            tracing::debug!(error = %self, error_code = error_code, "Request refused");
        }

        (status, Json(body)).into_response()
    }
}
