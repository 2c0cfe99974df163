//! Per-request network selection.
//!
//! A static table maps network keys to their RPC endpoint, explorer and
//! precision. Requests name a network (or not); the resolver overlays the
//! matching entry onto the process-wide payment defaults.

use crate::models::{PaymentConfig, TokenType};
use std::collections::HashMap;

pub const DEFAULT_NETWORK: &str = "pharos-testnet";
pub const DEFAULT_RPC_URL: &str = "https://testnet.dplabs-internal.com";
pub const DEFAULT_EXPLORER_BASE_URL: &str = "https://pharos-testnet.socialscan.io/tx";
pub const DEFAULT_DECIMALS: u32 = 18;
pub const DEFAULT_EXPIRES_IN_SECONDS: u64 = 300;

/// Header callers use to pick a network.
pub const NETWORK_HEADER: &str = "x-pharos-network";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEntry {
    pub network: String,
    pub rpc_url: String,
    pub explorer_base_url: String,
    pub decimals: u32,
    pub token_type: TokenType,
}

impl NetworkEntry {
    /// Entry built from the literal defaults, for a network absent from the table.
    pub fn fallback(network: &str) -> Self {
        Self {
            network: network.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            explorer_base_url: DEFAULT_EXPLORER_BASE_URL.to_string(),
            decimals: DEFAULT_DECIMALS,
            token_type: TokenType::Native,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NetworkTable {
    entries: HashMap<String, NetworkEntry>,
}

impl NetworkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Networks known out of the box.
    pub fn builtin() -> Self {
        Self::new().with_entry(NetworkEntry {
            network: "pharos-testnet".to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            explorer_base_url: DEFAULT_EXPLORER_BASE_URL.to_string(),
            decimals: 18,
            token_type: TokenType::Native,
        })
    }

    pub fn with_entry(mut self, entry: NetworkEntry) -> Self {
        self.insert(entry);
        self
    }

    pub fn insert(&mut self, entry: NetworkEntry) {
        self.entries.insert(entry.network.clone(), entry);
    }

    pub fn get(&self, network: &str) -> Option<&NetworkEntry> {
        self.entries.get(network)
    }
}

/// Process-wide payment settings. Built once at startup, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDefaults {
    pub network: String,
    pub recipient: String,
    pub rpc_url: String,
    pub explorer_base_url: String,
    pub decimals: u32,
    pub token_type: TokenType,
    pub expires_in_seconds: u64,
    pub payment_url: Option<String>,
}

impl PaymentDefaults {
    pub fn from_entry(entry: &NetworkEntry, recipient: &str) -> Self {
        Self {
            network: entry.network.clone(),
            recipient: recipient.to_lowercase(),
            rpc_url: entry.rpc_url.clone(),
            explorer_base_url: entry.explorer_base_url.clone(),
            decimals: entry.decimals,
            token_type: entry.token_type,
            expires_in_seconds: DEFAULT_EXPIRES_IN_SECONDS,
            payment_url: None,
        }
    }

    pub fn with_expiry(mut self, seconds: u64) -> Self {
        self.expires_in_seconds = seconds;
        self
    }

    pub fn with_payment_url(mut self, url: Option<String>) -> Self {
        self.payment_url = url;
        self
    }
}

#[derive(Debug, Clone)]
pub struct NetworkResolver {
    defaults: PaymentDefaults,
    networks: NetworkTable,
}

impl NetworkResolver {
    pub fn new(defaults: PaymentDefaults, networks: NetworkTable) -> Self {
        Self { defaults, networks }
    }

    /// Effective configuration for `network_key`.
    ///
    /// Unknown or absent keys fall back to the default network's entry, and
    /// when that is missing too, to the defaults themselves. Recipient,
    /// expiry and payment URL always come from the defaults.
    pub fn resolve(&self, network_key: Option<&str>) -> PaymentConfig {
        let key = network_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(self.defaults.network.as_str());

        let entry = self
            .networks
            .get(key)
            .or_else(|| self.networks.get(&self.defaults.network));

        if entry.is_none() {
            tracing::debug!(network = key, "No table entry for network, using defaults");
        }

        let (network, rpc_url, explorer_base_url, decimals, token_type) = match entry {
            Some(e) => (
                e.network.clone(),
                e.rpc_url.clone(),
                e.explorer_base_url.clone(),
                e.decimals,
                e.token_type,
            ),
            None => (
                self.defaults.network.clone(),
                self.defaults.rpc_url.clone(),
                self.defaults.explorer_base_url.clone(),
                self.defaults.decimals,
                self.defaults.token_type,
            ),
        };

        PaymentConfig {
            network,
            rpc_url,
            explorer_base_url,
            recipient: self.defaults.recipient.clone(),
            decimals,
            token_type,
            expires_in_seconds: self.defaults.expires_in_seconds,
            payment_url: self.defaults.payment_url.clone(),
        }
    }

    /// Header value wins over body field; empty values count as absent.
    pub fn resolve_request(&self, header: Option<&str>, body: Option<&str>) -> PaymentConfig {
        let key = header
            .filter(|h| !h.trim().is_empty())
            .or(body.filter(|b| !b.trim().is_empty()));
        self.resolve(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "0x49E0329808559A9AA742A3CF01CEC9B773A53834";

    fn resolver() -> NetworkResolver {
        let table = NetworkTable::builtin().with_entry(NetworkEntry {
            network: "devnet".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            explorer_base_url: "http://explorer.dev/tx".to_string(),
            decimals: 6,
            token_type: TokenType::Native,
        });
        let defaults = PaymentDefaults::from_entry(
            table.get(DEFAULT_NETWORK).expect("builtin entry"),
            RECIPIENT,
        )
        .with_expiry(120);
        NetworkResolver::new(defaults, table)
    }

    #[test]
    fn test_known_key_uses_entry_with_process_recipient() {
        let config = resolver().resolve(Some("devnet"));
        assert_eq!(config.network, "devnet");
        assert_eq!(config.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.explorer_base_url, "http://explorer.dev/tx");
        assert_eq!(config.decimals, 6);
        assert_eq!(config.recipient, RECIPIENT.to_lowercase());
        assert_eq!(config.expires_in_seconds, 120);
    }

    #[test]
    fn test_unknown_key_falls_back_to_default_network() {
        let resolver = resolver();
        let config = resolver.resolve(Some("no-such-chain"));
        assert_eq!(config, resolver.resolve(None));
        assert_eq!(config.network, DEFAULT_NETWORK);
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.decimals, 18);
    }

    #[test]
    fn test_empty_table_uses_literal_defaults() {
        let defaults = PaymentDefaults::from_entry(&NetworkEntry::fallback("solo"), RECIPIENT);
        let resolver = NetworkResolver::new(defaults, NetworkTable::new());

        let config = resolver.resolve(Some("anything"));
        assert_eq!(config.network, "solo");
        assert_eq!(config.explorer_base_url, DEFAULT_EXPLORER_BASE_URL);
        assert_eq!(config.decimals, DEFAULT_DECIMALS);
        assert_eq!(config.token_type, TokenType::Native);
    }

    #[test]
    fn test_header_beats_body() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve_request(Some("devnet"), Some("pharos-testnet")).network,
            "devnet"
        );
        assert_eq!(
            resolver.resolve_request(Some(""), Some("devnet")).network,
            "devnet"
        );
        assert_eq!(resolver.resolve_request(None, None).network, DEFAULT_NETWORK);
    }
}
