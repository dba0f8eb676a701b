//! Raw provider transports.
//!
//! # Responsibilities
//! - Define the seam between this crate and whatever carries the wallet
//!   JSON-RPC conversation (injected provider, HTTP bridge, test double)
//! - Ship the HTTP bridge implementation the CLI uses

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::broadcast;
use url::Url;

use crate::provider::types::ProviderEvent;

/// Errors a transport can produce. Raw JSON-RPC error codes survive here
/// and are mapped to tagged variants by the gateway.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The provider answered with a JSON-RPC error object.
    #[error("provider rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The request never produced a usable JSON-RPC reply.
    #[error("transport failure: {0}")]
    Io(String),
}

/// Request/subscribe primitives of a wallet provider.
///
/// Implementations suspend until the wallet (and its user) respond; an
/// issued request cannot be retracted by dropping the future.
#[async_trait]
pub trait ProviderTransport: Send + Sync + fmt::Debug {
    /// Issue a single JSON-RPC request and return its `result` value.
    async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError>;

    /// Subscribe to provider-emitted events.
    fn events(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// JSON-RPC-over-HTTP transport for driving the flow from outside a
/// browser, against a wallet bridge or a dev node.
///
/// HTTP endpoints deliver no push events; the event stream never fires.
#[derive(Debug)]
pub struct HttpBridgeTransport {
    endpoint: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
    events: broadcast::Sender<ProviderEvent>,
}

impl HttpBridgeTransport {
    /// Create a transport for the given endpoint with a per-request timeout.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Io(format!("failed to build http client: {e}")))?;
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            endpoint,
            client,
            next_id: AtomicU64::new(1),
            events,
        })
    }

    async fn post(&self, method: &str, params: &Value) -> Result<Value, TransportError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| TransportError::Io(format!("bridge request failed: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Io(format!("bridge json decode failed: {e}")))?;

        if !status.is_success() {
            return Err(TransportError::Io(format!(
                "bridge status {status}: {body}"
            )));
        }

        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unspecified provider error")
                .to_string();
            return Err(TransportError::Rpc { code, message });
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| TransportError::Io("bridge reply missing result".to_string()))
    }
}

#[async_trait]
impl ProviderTransport for HttpBridgeTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        match self.post(method, &params).await {
            // Dev nodes expose eth_accounts but not the wallet prompt method.
            Err(TransportError::Rpc { code: -32601, .. }) if method == "eth_requestAccounts" => {
                tracing::debug!("eth_requestAccounts unsupported by bridge, using eth_accounts");
                self.post("eth_accounts", &params).await
            }
            other => other,
        }
    }

    fn events(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
