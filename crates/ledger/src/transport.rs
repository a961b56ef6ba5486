//! Untyped wire dispatch: the one seam where operation names are strings.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::LedgerError;
use crate::types::CallReceipt;

/// The two primitives the external ledger exposes.
///
/// `query` is read-only and side-effect-free; `call` submits a signed
/// operation and returns its receipt. Everything above this trait is typed.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn query(&self, name: &str, args: Value) -> Result<Value, LedgerError>;

    async fn call(&self, operation: &str, args: Value) -> Result<CallReceipt, LedgerError>;
}

/// JSON-RPC over HTTP adapter for a remote node.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    chain_id: u64,
    timeout: Duration,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl HttpTransport {
    pub fn new(
        endpoint: impl Into<String>,
        chain_id: u64,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LedgerError::Http)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            chain_id,
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "Dispatching ledger request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?
            .error_for_status()
            .map_err(|e| self.classify(e))?;

        let envelope: RpcEnvelope = response.json().await.map_err(|e| self.classify(e))?;

        if let Some(err) = envelope.error {
            return Err(LedgerError::Node {
                code: err.code,
                message: err.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| LedgerError::Decode("response carries neither result nor error".into()))
    }

    fn classify(&self, error: reqwest::Error) -> LedgerError {
        if error.is_timeout() {
            LedgerError::Timeout(self.timeout)
        } else {
            LedgerError::Http(error)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn query(&self, name: &str, args: Value) -> Result<Value, LedgerError> {
        self.request(name, args).await
    }

    async fn call(&self, operation: &str, args: Value) -> Result<CallReceipt, LedgerError> {
        let mut args = args;
        if let Value::Object(map) = &mut args {
            map.insert("chainId".into(), self.chain_id.into());
        }

        let result = self.request(operation, args).await?;
        serde_json::from_value(result).map_err(|e| LedgerError::Decode(e.to_string()))
    }
}
