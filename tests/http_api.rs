use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pharos_gate::{
    app::build_router,
    models::TokenType,
    services::{
        network::{DEFAULT_NETWORK, DEFAULT_RPC_URL},
        NetworkEntry, NetworkResolver, NetworkTable, PaymentDefaults,
        PaymentVerifier, PollingPolicy, RpcError, RpcTransport,
    },
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const RECIPIENT: &str = "0x49e0329808559a9aa742a3cf01cec9b773a53834";
const PAYER: &str = "0x1111111111111111111111111111111111111111";
const PAID: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";
const REVERTED: &str = "0x00000000000000000000000000000000000000000000000000000000000000bb";
const DUST: &str = "0x00000000000000000000000000000000000000000000000000000000000000cc";
const DEVNET_RPC_URL: &str = "http://127.0.0.1:8545";

#[derive(Default)]
struct FakeChain {
    transactions: HashMap<String, Value>,
    receipts: HashMap<String, Value>,
}

impl FakeChain {
    fn with_tx(mut self, hash: &str, value: &str, status: &str) -> Self {
        self.transactions.insert(
            hash.to_string(),
            json!({ "hash": hash, "from": PAYER, "to": RECIPIENT, "value": value }),
        );
        self.receipts
            .insert(hash.to_string(), json!({ "status": status }));
        self
    }
}

#[async_trait]
impl RpcTransport for FakeChain {
    async fn call(&self, rpc_url: &str, method: &str, params: Value) -> Result<Value, RpcError> {
        if rpc_url != DEFAULT_RPC_URL && rpc_url != DEVNET_RPC_URL {
            return Err(RpcError::Http {
                status: 502,
                reason: format!("no node at {}", rpc_url),
            });
        }
        let hash = params.get(0).and_then(Value::as_str).unwrap_or_default();
        match method {
            "eth_blockNumber" => Ok(json!("0x10")),
            "eth_getTransactionByHash" => Ok(self.transactions.get(hash).cloned().unwrap_or(Value::Null)),
            "eth_getTransactionReceipt" => Ok(self.receipts.get(hash).cloned().unwrap_or(Value::Null)),
            _ => Err(RpcError::Remote {
                code: -32601,
                message: "method not found".to_string(),
            }),
        }
    }
}

fn app() -> Router {
    let chain = FakeChain::default()
        .with_tx(PAID, "0xDE0B6B3A7640000", "0x1")
        .with_tx(REVERTED, "0xDE0B6B3A7640000", "0x0")
        .with_tx(DUST, "0x1", "0x1");

    let table = NetworkTable::builtin().with_entry(NetworkEntry {
        network: "pharos-devnet".to_string(),
        rpc_url: DEVNET_RPC_URL.to_string(),
        explorer_base_url: "http://devnet.explorer/tx".to_string(),
        decimals: 18,
        token_type: TokenType::Native,
    });
    let defaults = PaymentDefaults::from_entry(
        table.get(DEFAULT_NETWORK).expect("builtin network"),
        RECIPIENT,
    );
    let resolver = Arc::new(NetworkResolver::new(defaults, table));

    let verifier = Arc::new(PaymentVerifier::new(Arc::new(chain)).with_polling(PollingPolicy {
        max_attempts: 2,
        interval: Duration::ZERO,
    }));

    build_router(verifier, resolver, "0.01")
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).expect("json body");
    (status, body)
}

fn verify_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/payments/verify")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn verify_endpoint_accepts_matching_payment() {
    let (status, body) = send(verify_request(json!({ "txHash": PAID, "amount": "1.0" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["code"], "ok");
    assert_eq!(body["amountRaw"], "1000000000000000000");
    assert_eq!(body["payer"], PAYER);
    assert_eq!(body["network"], DEFAULT_NETWORK);
    assert_eq!(
        body["explorerUrl"],
        format!("https://pharos-testnet.socialscan.io/tx/{}", PAID)
    );
}

#[tokio::test]
async fn verify_endpoint_accepts_legacy_fields_and_numeric_amounts() {
    let (status, body) = send(verify_request(json!({
        "signature": DUST,
        "amount": 0.5,
        "mint": "legacy-mint",
        "memo": "order-42",
    })))
    .await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], "amount_too_low");
    assert_eq!(body["details"]["expected"], "500000000000000000");
    assert_eq!(body["details"]["actual"], "1");
}

#[tokio::test]
async fn verify_endpoint_uses_network_header() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/payments/verify")
        .header("content-type", "application/json")
        .header("x-pharos-network", "pharos-devnet")
        .body(Body::from(json!({ "txHash": REVERTED, "amount": "1" }).to_string()))
        .expect("request");

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], "tx_failed");
    assert_eq!(body["explorerUrl"], format!("http://devnet.explorer/tx/{}", REVERTED));
}

#[tokio::test]
async fn verify_endpoint_unknown_network_falls_back_to_default() {
    let (_, body) = send(verify_request(json!({
        "txHash": PAID,
        "amount": "1",
        "network": "made-up-chain",
    })))
    .await;

    assert_eq!(body["ok"], true);
    assert_eq!(body["network"], DEFAULT_NETWORK);
}

#[tokio::test]
async fn verify_endpoint_ignores_body_network_config() {
    let (status, body) = send(verify_request(json!({
        "txHash": PAID,
        "amount": "1.0",
        "networkConfig": {
            "network": "elsewhere",
            "rpcUrl": "http://10.0.0.1:8545",
            "explorerBaseUrl": "http://elsewhere.explorer/tx",
            "recipient": PAYER,
            "decimals": 4294967295u32,
        },
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "ok");
    assert_eq!(body["network"], DEFAULT_NETWORK);
    assert_eq!(
        body["explorerUrl"],
        format!("https://pharos-testnet.socialscan.io/tx/{}", PAID)
    );
}

#[tokio::test]
async fn verify_endpoint_rejects_oversized_decimals() {
    let (status, body) = send(verify_request(json!({
        "txHash": PAID,
        "amount": "1",
        "decimals": 4294967295u32,
    })))
    .await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["code"], "amount_encode_error");
}

#[tokio::test]
async fn verify_endpoint_reports_missing_hash() {
    let (status, body) = send(verify_request(json!({ "amount": "1" }))).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["ok"], false);
    assert_eq!(body["code"], "missing_tx_hash");
    assert_eq!(body["message"], "Missing transaction hash");
}

#[tokio::test]
async fn paid_endpoint_without_payment_returns_instructions() {
    let request = Request::builder()
        .uri("/api/paid/receipt")
        .body(Body::empty())
        .expect("request");

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error_code"], "PAYMENT_REQUIRED");
    let payment = &body["payment_instructions"]["payment"];
    assert_eq!(payment["recipient"], RECIPIENT);
    assert_eq!(payment["amount"], "0.01");
    assert_eq!(payment["network"], DEFAULT_NETWORK);
    assert_eq!(body["payment_instructions"]["instructions"]["header"], "X-Payment");
}

#[tokio::test]
async fn paid_endpoint_releases_after_verified_payment() {
    let request = Request::builder()
        .uri("/api/paid/receipt")
        .header("X-Payment", PAID)
        .header("X-Payer", PAYER)
        .body(Body::empty())
        .expect("request");

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["code"], "ok");
    assert_eq!(body["data"]["payer"], PAYER);
}

#[tokio::test]
async fn paid_endpoint_rejects_failed_payment() {
    let request = Request::builder()
        .uri("/api/paid/receipt")
        .header("X-Payment", REVERTED)
        .body(Body::empty())
        .expect("request");

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error_code"], "PAYMENT_VERIFICATION_FAILED");
    assert_eq!(
        body["explorer_url"],
        format!("https://pharos-testnet.socialscan.io/tx/{}", REVERTED)
    );
}

#[tokio::test]
async fn paid_endpoint_rejects_wrong_payer() {
    let request = Request::builder()
        .uri("/api/paid/receipt")
        .header("X-Payment", PAID)
        .header("X-Payer", "0x9999999999999999999999999999999999999999")
        .body(Body::empty())
        .expect("request");

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(body["error"]
        .as_str()
        .expect("error text")
        .contains("different wallet"));
}

#[tokio::test]
async fn health_reports_rpc_status() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rpc_reachable"], true);
    assert_eq!(body["network"], DEFAULT_NETWORK);
}
