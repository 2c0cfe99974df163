//! On-chain settlement check for native-coin payments.
//!
//! Given a transaction hash and an invoice, the verifier fetches the
//! transaction and its receipt from the network's own RPC endpoint and
//! accepts the payment only if it succeeded, reached the right recipient,
//! came from the expected wallet (when one is named) and moved at least the
//! invoiced amount.

use crate::models::{OnChainTransaction, Outcome, PaymentConfig, VerificationRequest, Verdict};
use crate::services::amount::to_base_units;
use crate::services::clock::{Clock, TokioClock};
use crate::services::rpc::{RpcError, RpcTransport};
use num_bigint::BigUint;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long to wait for a freshly broadcast transaction to be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_millis(2000),
        }
    }
}

pub struct PaymentVerifier {
    transport: Arc<dyn RpcTransport>,
    clock: Arc<dyn Clock>,
    polling: PollingPolicy,
}

impl PaymentVerifier {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            clock: Arc::new(TokioClock),
            polling: PollingPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_polling(mut self, polling: PollingPolicy) -> Self {
        self.polling = polling;
        self
    }

    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }

    /// Runs the full validation pipeline. Never fails: every problem,
    /// including RPC failures, is reported as a rejected [`Verdict`].
    pub async fn verify(&self, config: &PaymentConfig, request: &VerificationRequest) -> Verdict {
        let config = match &request.network_config {
            Some(overrides) => config.with_overrides(overrides),
            None => config.clone(),
        };
        let tx_hash = request.tx_hash.trim();

        let outcome = self.evaluate(&config, request, tx_hash).await;

        match &outcome {
            Outcome::Verified {
                payer,
                amount_raw,
                network,
            } => info!(
                tx_hash,
                payer = %payer,
                amount_raw = %amount_raw,
                network = %network,
                "Payment verified"
            ),
            rejected => warn!(
                tx_hash,
                code = %rejected.code(),
                network = %config.network,
                "Payment rejected: {}",
                rejected.message()
            ),
        }

        Verdict::new(outcome, config.explorer_url(tx_hash))
    }

    async fn evaluate(
        &self,
        config: &PaymentConfig,
        request: &VerificationRequest,
        tx_hash: &str,
    ) -> Outcome {
        if tx_hash.is_empty() {
            return Outcome::MissingTxHash;
        }

        let expected_recipient = request.effective_recipient(config);
        if expected_recipient.is_empty() {
            return Outcome::MissingRecipient;
        }

        match self
            .check_on_chain(config, request, tx_hash, &expected_recipient)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(tx_hash, error = %e, "Error verifying payment");
                Outcome::VerificationError {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn check_on_chain(
        &self,
        config: &PaymentConfig,
        request: &VerificationRequest,
        tx_hash: &str,
        expected_recipient: &str,
    ) -> Result<Outcome, RpcError> {
        let Some(tx) = self.poll_transaction(&config.rpc_url, tx_hash).await else {
            return Ok(Outcome::TxNotFound);
        };

        let Some(receipt) = self
            .transport
            .get_transaction_receipt(&config.rpc_url, tx_hash)
            .await?
        else {
            return Ok(Outcome::ReceiptNotFound);
        };

        if !receipt.is_success() {
            return Ok(Outcome::TxFailed {
                status: receipt.status,
            });
        }

        let from = tx.from.as_deref().unwrap_or_default().to_lowercase();
        let to = tx.to.as_deref().unwrap_or_default().to_lowercase();

        if to != expected_recipient {
            return Ok(Outcome::WrongRecipient {
                expected_recipient: expected_recipient.to_string(),
                actual_recipient: to,
            });
        }

        if let Some(expected_wallet) = request.expected_payer() {
            if from != expected_wallet {
                return Ok(Outcome::WalletMismatch {
                    expected_wallet,
                    actual_wallet: from,
                });
            }
        }

        let actual = parse_quantity(tx.value.as_deref())?;

        let decimals = request.effective_decimals(config);
        let expected = match to_base_units(request.amount.as_ref(), decimals) {
            Ok(expected) => expected,
            Err(e) => {
                return Ok(Outcome::AmountEncodeError {
                    reason: e.to_string(),
                })
            }
        };

        if actual < expected {
            return Ok(Outcome::AmountTooLow { expected, actual });
        }

        Ok(Outcome::Verified {
            payer: from,
            amount_raw: actual,
            network: config.network.clone(),
        })
    }

    /// Looks the transaction up until it shows up or the attempts run out.
    /// Lookup errors count as "not found yet".
    async fn poll_transaction(&self, rpc_url: &str, tx_hash: &str) -> Option<OnChainTransaction> {
        let attempts = self.polling.max_attempts.max(1);

        for attempt in 1..=attempts {
            match self.transport.get_transaction_by_hash(rpc_url, tx_hash).await {
                Ok(Some(tx)) => {
                    debug!(tx_hash, attempt, "Transaction found");
                    return Some(tx);
                }
                Ok(None) => debug!(tx_hash, attempt, attempts, "Transaction not indexed yet"),
                Err(e) => warn!(tx_hash, attempt, attempts, error = %e, "Transaction lookup failed"),
            }

            if attempt < attempts {
                self.clock.sleep(self.polling.interval).await;
            }
        }

        warn!(tx_hash, attempts, "Transaction not found after polling");
        None
    }
}

/// Parses an RPC hex quantity such as `"0xde0b6b3a7640000"`. Missing means zero.
fn parse_quantity(value: Option<&str>) -> Result<BigUint, RpcError> {
    let raw = value.unwrap_or("0x0");
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    if digits.is_empty() {
        return Ok(BigUint::from(0u32));
    }

    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| RpcError::Decode(format!("invalid transaction value: {}", raw)))
}
