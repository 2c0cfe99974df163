use num_bigint::BigUint;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

/// Stable code reported with every verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictCode {
    Ok,
    MissingTxHash,
    MissingRecipient,
    TxNotFound,
    ReceiptNotFound,
    TxFailed,
    WrongRecipient,
    WalletMismatch,
    AmountEncodeError,
    AmountTooLow,
    VerificationError,
}

impl VerdictCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictCode::Ok => "ok",
            VerdictCode::MissingTxHash => "missing_tx_hash",
            VerdictCode::MissingRecipient => "missing_recipient",
            VerdictCode::TxNotFound => "tx_not_found",
            VerdictCode::ReceiptNotFound => "receipt_not_found",
            VerdictCode::TxFailed => "tx_failed",
            VerdictCode::WrongRecipient => "wrong_recipient",
            VerdictCode::WalletMismatch => "wallet_mismatch",
            VerdictCode::AmountEncodeError => "amount_encode_error",
            VerdictCode::AmountTooLow => "amount_too_low",
            VerdictCode::VerificationError => "verification_error",
        }
    }
}

impl fmt::Display for VerdictCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the verification pipeline concluded, with the data each case needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Verified {
        payer: String,
        amount_raw: BigUint,
        network: String,
    },
    MissingTxHash,
    MissingRecipient,
    TxNotFound,
    ReceiptNotFound,
    TxFailed {
        status: Option<String>,
    },
    WrongRecipient {
        expected_recipient: String,
        actual_recipient: String,
    },
    WalletMismatch {
        expected_wallet: String,
        actual_wallet: String,
    },
    AmountEncodeError {
        reason: String,
    },
    AmountTooLow {
        expected: BigUint,
        actual: BigUint,
    },
    VerificationError {
        reason: String,
    },
}

impl Outcome {
    pub fn code(&self) -> VerdictCode {
        match self {
            Outcome::Verified { .. } => VerdictCode::Ok,
            Outcome::MissingTxHash => VerdictCode::MissingTxHash,
            Outcome::MissingRecipient => VerdictCode::MissingRecipient,
            Outcome::TxNotFound => VerdictCode::TxNotFound,
            Outcome::ReceiptNotFound => VerdictCode::ReceiptNotFound,
            Outcome::TxFailed { .. } => VerdictCode::TxFailed,
            Outcome::WrongRecipient { .. } => VerdictCode::WrongRecipient,
            Outcome::WalletMismatch { .. } => VerdictCode::WalletMismatch,
            Outcome::AmountEncodeError { .. } => VerdictCode::AmountEncodeError,
            Outcome::AmountTooLow { .. } => VerdictCode::AmountTooLow,
            Outcome::VerificationError { .. } => VerdictCode::VerificationError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::Verified { network, .. } => format!("Payment verified on {}", network),
            Outcome::MissingTxHash => "Missing transaction hash".to_string(),
            Outcome::MissingRecipient => "No recipient configured for payments".to_string(),
            Outcome::TxNotFound => "Transaction not found on chain after polling".to_string(),
            Outcome::ReceiptNotFound => "Transaction receipt not found on chain".to_string(),
            Outcome::TxFailed { .. } => "Transaction status is not successful".to_string(),
            Outcome::WrongRecipient { .. } => {
                "Payment was sent to a different address".to_string()
            }
            Outcome::WalletMismatch { .. } => {
                "Payment was sent from a different wallet than expected".to_string()
            }
            Outcome::AmountEncodeError { reason } => {
                format!("Failed to encode expected amount: {}", reason)
            }
            Outcome::AmountTooLow { .. } => {
                "On-chain amount is below invoice requirement".to_string()
            }
            Outcome::VerificationError { reason } => reason.clone(),
        }
    }

    /// Expected vs. actual values for business-rule rejections.
    pub fn details(&self) -> Option<Value> {
        match self {
            Outcome::TxFailed { status } => Some(json!({
                "expectedStatus": crate::models::OnChainReceipt::SUCCESS,
                "actualStatus": status,
            })),
            Outcome::WrongRecipient {
                expected_recipient,
                actual_recipient,
            } => Some(json!({
                "expectedRecipient": expected_recipient,
                "actualRecipient": actual_recipient,
            })),
            Outcome::WalletMismatch {
                expected_wallet,
                actual_wallet,
            } => Some(json!({
                "expectedWallet": expected_wallet,
                "actualWallet": actual_wallet,
            })),
            Outcome::AmountTooLow { expected, actual } => Some(json!({
                "expected": expected.to_string(),
                "actual": actual.to_string(),
            })),
            _ => None,
        }
    }
}

/// The single result of a verification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    explorer_url: String,
    outcome: Outcome,
}

impl Verdict {
    pub fn new(outcome: Outcome, explorer_url: impl Into<String>) -> Self {
        Self {
            explorer_url: explorer_url.into(),
            outcome,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Verified { .. })
    }

    pub fn code(&self) -> VerdictCode {
        self.outcome.code()
    }

    pub fn message(&self) -> String {
        self.outcome.message()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn explorer_url(&self) -> &str {
        &self.explorer_url
    }

    pub fn details(&self) -> Option<Value> {
        self.outcome.details()
    }

    pub fn payer(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Verified { payer, .. } => Some(payer),
            _ => None,
        }
    }

    /// On-chain amount in base units, as a decimal string.
    pub fn amount_raw(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Verified { amount_raw, .. } => Some(amount_raw.to_string()),
            _ => None,
        }
    }

    pub fn network(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Verified { network, .. } => Some(network),
            _ => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerdictBody<'a> {
    ok: bool,
    code: VerdictCode,
    message: String,
    explorer_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    network: Option<&'a str>,
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        VerdictBody {
            ok: self.is_ok(),
            code: self.code(),
            message: self.message(),
            explorer_url: &self.explorer_url,
            details: self.details(),
            payer: self.payer(),
            amount_raw: self.amount_raw(),
            network: self.network(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_verdict_wire_shape() {
        let verdict = Verdict::new(
            Outcome::Verified {
                payer: "0xpayer".to_string(),
                amount_raw: BigUint::from(1_000_000_000_000_000_000u64),
                network: "pharos-testnet".to_string(),
            },
            "https://explorer/tx/0x1",
        );

        let value = serde_json::to_value(&verdict).expect("serializes");
        assert_eq!(value["ok"], true);
        assert_eq!(value["code"], "ok");
        assert_eq!(value["explorerUrl"], "https://explorer/tx/0x1");
        assert_eq!(value["amountRaw"], "1000000000000000000");
        assert_eq!(value["payer"], "0xpayer");
        assert_eq!(value["network"], "pharos-testnet");
        assert!(value.get("details").is_none());
    }

    #[test]
    fn test_rejection_carries_details_but_no_payer() {
        let verdict = Verdict::new(
            Outcome::AmountTooLow {
                expected: BigUint::from(10u32),
                actual: BigUint::from(9u32),
            },
            "https://explorer/tx/0x2",
        );

        assert!(!verdict.is_ok());
        let value = serde_json::to_value(&verdict).expect("serializes");
        assert_eq!(value["ok"], false);
        assert_eq!(value["code"], "amount_too_low");
        assert_eq!(value["details"]["expected"], "10");
        assert_eq!(value["details"]["actual"], "9");
        assert!(value.get("payer").is_none());
        assert!(value.get("amountRaw").is_none());
    }

    #[test]
    fn test_code_strings_match_serde_names() {
        let codes = [
            VerdictCode::Ok,
            VerdictCode::MissingTxHash,
            VerdictCode::TxNotFound,
            VerdictCode::AmountEncodeError,
            VerdictCode::VerificationError,
        ];
        for code in codes {
            let value = serde_json::to_value(code).expect("serializes");
            assert_eq!(value, code.as_str());
        }
    }
}
