use crate::models::Amount;
use crate::services::{
    network::{
        NetworkEntry, NetworkTable, PaymentDefaults, DEFAULT_EXPIRES_IN_SECONDS, DEFAULT_NETWORK,
    },
    to_base_units, NetworkResolver, PollingPolicy,
};
use anyhow::{bail, Context, Result};
use ethers::types::Address;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_RECIPIENT: &str = "0x49e0329808559a9aa742a3cf01cec9b773a53834";

#[derive(Debug, Clone)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Payments
    pub payments: PaymentDefaults,
    pub networks: NetworkTable,
    pub polling: PollingPolicy,

    // Price of the gated endpoint, in the network's native coin
    pub price: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::parse_environment()?;
        let (payments, networks) = Self::parse_payments()?;

        let config = Self {
            environment,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            payments,
            networks,
            polling: PollingPolicy {
                max_attempts: std::env::var("X402_POLL_ATTEMPTS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .context("Invalid X402_POLL_ATTEMPTS")?,
                interval: Duration::from_millis(
                    std::env::var("X402_POLL_INTERVAL_MS")
                        .unwrap_or_else(|_| "2000".to_string())
                        .parse()
                        .context("Invalid X402_POLL_INTERVAL_MS")?,
                ),
            },

            price: std::env::var("X402_PRICE").unwrap_or_else(|_| "0.01".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Resolver over this configuration's defaults and network table.
    pub fn resolver(&self) -> NetworkResolver {
        NetworkResolver::new(self.payments.clone(), self.networks.clone())
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    /// Builds the payment defaults. `X402_RPC_URL`, `X402_EXPLORER_BASE_URL`
    /// and `X402_DECIMALS` also rewrite the default network's table entry so
    /// requests resolving to it see the same values.
    fn parse_payments() -> Result<(PaymentDefaults, NetworkTable)> {
        let network = std::env::var("X402_NETWORK").unwrap_or_else(|_| DEFAULT_NETWORK.to_string());

        let mut networks = NetworkTable::builtin();
        let mut entry = networks
            .get(&network)
            .cloned()
            .unwrap_or_else(|| NetworkEntry::fallback(&network));

        if let Ok(rpc_url) = std::env::var("X402_RPC_URL") {
            entry.rpc_url = rpc_url;
        }
        if let Ok(explorer) = std::env::var("X402_EXPLORER_BASE_URL") {
            entry.explorer_base_url = explorer;
        }
        if let Ok(decimals) = std::env::var("X402_DECIMALS") {
            entry.decimals = decimals.parse().context("Invalid X402_DECIMALS")?;
        }
        networks.insert(entry.clone());

        let recipient = Self::parse_address("X402_RECIPIENT", DEFAULT_RECIPIENT)?;
        let expires_in_seconds = std::env::var("X402_EXPIRES_SECONDS")
            .unwrap_or_else(|_| DEFAULT_EXPIRES_IN_SECONDS.to_string())
            .parse()
            .context("Invalid X402_EXPIRES_SECONDS")?;
        let payment_url = std::env::var("X402_PAYMENT_URL").ok();

        let defaults = PaymentDefaults::from_entry(&entry, &recipient)
            .with_expiry(expires_in_seconds)
            .with_payment_url(payment_url);

        Ok((defaults, networks))
    }

    /// Reads an EVM address and returns it as lower-case hex.
    fn parse_address(var: &str, default: &str) -> Result<String> {
        let addr_str = std::env::var(var).unwrap_or_else(|_| default.to_string());
        let address = Address::from_str(&addr_str)
            .with_context(|| format!("Invalid address for {}", var))?;
        Ok(format!("{:?}", address))
    }

    fn validate(&self) -> Result<()> {
        if !self.payments.rpc_url.starts_with("http") {
            bail!("X402_RPC_URL must be HTTP(S) URL");
        }
        if self.polling.max_attempts == 0 {
            bail!("X402_POLL_ATTEMPTS must be at least 1");
        }
        if to_base_units(Some(&Amount::from(self.price.as_str())), self.payments.decimals).is_err() {
            bail!(
                "X402_PRICE {} is not a valid amount with {} decimals",
                self.price,
                self.payments.decimals
            );
        }

        tracing::info!(
            "Configuration validated for {:?} environment (network: {}, recipient: {})",
            self.environment,
            self.payments.network,
            self.payments.recipient
        );

        Ok(())
    }
}
