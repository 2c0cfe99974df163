use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize,
};
use std::fmt;

/// How value moves on a network. Only the chain's native coin is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    #[default]
    Native,
}

/// Effective payment settings for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    pub network: String,
    pub rpc_url: String,
    pub explorer_base_url: String,
    /// Always stored lower-case.
    pub recipient: String,
    pub decimals: u32,
    pub token_type: TokenType,
    pub expires_in_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
}

impl PaymentConfig {
    /// Link to the transaction on the network's block explorer.
    pub fn explorer_url(&self, tx_hash: &str) -> String {
        format!("{}/{}", self.explorer_base_url, tx_hash)
    }

    /// Applies caller-supplied overrides on top of this configuration.
    pub fn with_overrides(&self, overrides: &PaymentConfigOverride) -> PaymentConfig {
        let mut config = self.clone();

        if let Some(network) = non_empty(&overrides.network) {
            config.network = network.to_string();
        }
        if let Some(rpc_url) = non_empty(&overrides.rpc_url) {
            config.rpc_url = rpc_url.to_string();
        }
        if let Some(explorer) = non_empty(&overrides.explorer_base_url) {
            config.explorer_base_url = explorer.to_string();
        }
        if let Some(recipient) = non_empty(&overrides.recipient) {
            config.recipient = recipient.to_lowercase();
        }
        if let Some(decimals) = overrides.decimals {
            config.decimals = decimals;
        }

        config
    }
}

/// Partial [`PaymentConfig`] carried inside a verification request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfigOverride {
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub explorer_base_url: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// Digits an f64 carries without loss.
const MAX_NUMBER_DIGITS: usize = 15;

/// Human-readable invoice amount, e.g. `"0.01"`.
///
/// Accepts either a JSON string or a JSON number. Numbers are kept as their
/// shortest decimal rendering; the conversion to base units never goes
/// through floating point arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Amount(String);

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount(value.to_string())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Amount(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                Ok(Amount(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                Ok(Amount(v.to_string()))
            }

            // f64 Display never uses exponent notation. Past 15 significant
            // digits the rendering may no longer match what the caller sent.
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
                let rendered = v.to_string();
                let significant = significant_digits(&rendered);
                if significant > MAX_NUMBER_DIGITS {
                    return Err(E::custom(format!(
                        "numeric amount {} has {} significant digits, send it as a string",
                        rendered, significant
                    )));
                }
                Ok(Amount(rendered))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Input to [`crate::services::PaymentVerifier::verify`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    #[serde(default, alias = "signature")]
    pub tx_hash: String,
    #[serde(default)]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub expected_wallet: Option<String>,
    /// Set by the server only. Never read from a request body, so callers
    /// cannot choose the node that answers the RPC calls.
    #[serde(skip)]
    pub network_config: Option<PaymentConfigOverride>,
}

impl VerificationRequest {
    pub fn new(tx_hash: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            amount: Some(amount.into()),
            ..Default::default()
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub fn with_expected_wallet(mut self, wallet: impl Into<String>) -> Self {
        self.expected_wallet = Some(wallet.into());
        self
    }

    pub fn with_network_config(mut self, overrides: PaymentConfigOverride) -> Self {
        self.network_config = Some(overrides);
        self
    }

    /// Recipient the payment must reach, lower-cased. Empty when neither the
    /// request nor the configuration names one.
    pub fn effective_recipient(&self, config: &PaymentConfig) -> String {
        non_empty(&self.recipient)
            .unwrap_or(&config.recipient)
            .to_lowercase()
    }

    pub fn effective_decimals(&self, config: &PaymentConfig) -> u32 {
        self.decimals.unwrap_or(config.decimals)
    }

    pub fn expected_payer(&self) -> Option<String> {
        non_empty(&self.expected_wallet).map(str::to_lowercase)
    }
}

/// Transaction as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnChainTransaction {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// Hex quantity in the smallest unit.
    #[serde(default)]
    pub value: Option<String>,
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnChainReceipt {
    #[serde(default)]
    pub status: Option<String>,
}

impl OnChainReceipt {
    pub const SUCCESS: &'static str = "0x1";

    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(Self::SUCCESS)
    }
}

fn significant_digits(rendered: &str) -> usize {
    let digits: String = rendered.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').trim_end_matches('0').len()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
