use crate::models::{OnChainReceipt, OnChainTransaction};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC HTTP error: {status} {reason}")]
    Http { status: u16, reason: String },

    #[error("RPC error ({code}): {message}")]
    Remote { code: i64, message: String },

    #[error("Malformed RPC response: {0}")]
    Decode(String),
}

/// Sends one JSON-RPC request and returns its `result` (which may be `null`).
///
/// The verifier only talks to a network through this trait, so any transport
/// able to POST a JSON body works, including in-memory fakes.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, rpc_url: &str, method: &str, params: Value) -> Result<Value, RpcError>;

    async fn get_transaction_by_hash(
        &self,
        rpc_url: &str,
        tx_hash: &str,
    ) -> Result<Option<OnChainTransaction>, RpcError> {
        let result = self
            .call(rpc_url, "eth_getTransactionByHash", json!([tx_hash]))
            .await?;
        decode_optional(result)
    }

    async fn get_transaction_receipt(
        &self,
        rpc_url: &str,
        tx_hash: &str,
    ) -> Result<Option<OnChainReceipt>, RpcError> {
        let result = self
            .call(rpc_url, "eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        decode_optional(result)
    }

    async fn block_number(&self, rpc_url: &str) -> Result<u64, RpcError> {
        let result = self.call(rpc_url, "eth_blockNumber", json!([])).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| RpcError::Decode(format!("block number is not a string: {}", result)))?;
        u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| RpcError::Decode(format!("invalid block number {}: {}", hex, e)))
    }
}

fn decode_optional<T: DeserializeOwned>(value: Value) -> Result<Option<T>, RpcError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| RpcError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: Option<String>,
}

/// JSON-RPC 2.0 over HTTP POST.
#[derive(Clone, Default)]
pub struct HttpRpcClient {
    client: reqwest::Client,
}

impl HttpRpcClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn call(&self, rpc_url: &str, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self.client.post(rpc_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(RpcError::Remote {
                code: error.code,
                message: error.message.unwrap_or_else(|| "RPC error".to_string()),
            });
        }

        tracing::trace!(method, "RPC call succeeded");

        Ok(body.result.unwrap_or(Value::Null))
    }
}
