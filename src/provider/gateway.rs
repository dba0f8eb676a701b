//! Typed adapter over the wallet provider transport.
//!
//! # Responsibilities
//! - Expose the provider's request primitives as typed methods
//! - Map raw provider error codes into the closed `ProviderError` set
//! - Detect provider absence before any request is issued
//! - Maintain the chain-id cache (filled on first read, updated by
//!   `chainChanged` notifications and forced re-reads)

use std::sync::{Arc, RwLock};

use alloy::primitives::{Bytes, B256};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::config::ChainProfile;
use crate::provider::rpc::{
    parse_chain_id, AddChainParams, ReceiptView, SwitchChainParams, TransactionCall,
};
use crate::provider::transport::{ProviderTransport, TransportError};
use crate::provider::types::{
    ProviderError, ProviderEvent, CODE_CHAIN_UNREGISTERED, CODE_USER_REJECTED,
};

/// Map a raw transport error into the closed provider error set.
fn map_transport_error(err: TransportError) -> ProviderError {
    match err {
        TransportError::Rpc {
            code: CODE_USER_REJECTED,
            message,
        } => ProviderError::UserRejected(message),
        TransportError::Rpc {
            code: CODE_CHAIN_UNREGISTERED,
            ..
        } => ProviderError::ChainUnregistered,
        TransportError::Rpc { code, message } => {
            ProviderError::Rpc(format!("code {code}: {message}"))
        }
        TransportError::Io(message) => ProviderError::Rpc(message),
    }
}

#[derive(Debug)]
struct GatewayInner {
    transport: Option<Arc<dyn ProviderTransport>>,
    chain_cache: RwLock<Option<u64>>,
}

/// Thin adapter over the single wallet provider object.
///
/// Cheap to clone; clones share the transport and the chain-id cache.
#[derive(Debug, Clone)]
pub struct WalletGateway {
    inner: Arc<GatewayInner>,
}

impl WalletGateway {
    /// Wrap an available provider transport.
    pub fn new(transport: Arc<dyn ProviderTransport>) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                transport: Some(transport),
                chain_cache: RwLock::new(None),
            }),
        }
    }

    /// A gateway for an environment with no injected provider at all.
    pub fn absent() -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                transport: None,
                chain_cache: RwLock::new(None),
            }),
        }
    }

    /// Whether a provider is present. Checked before any request is made.
    pub fn is_available(&self) -> bool {
        self.inner.transport.is_some()
    }

    fn transport(&self) -> Result<&Arc<dyn ProviderTransport>, ProviderError> {
        self.inner.transport.as_ref().ok_or(ProviderError::Unavailable)
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let transport = self.transport()?;
        transport
            .request(method, params)
            .await
            .map_err(map_transport_error)
    }

    /// Subscribe to provider events, if a provider is present.
    pub fn events(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        self.inner.transport.as_ref().map(|t| t.events())
    }

    /// Request account access from the wallet (`eth_requestAccounts`).
    pub async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        let result = self.request("eth_requestAccounts", json!([])).await?;
        let entries = result
            .as_array()
            .ok_or_else(|| ProviderError::Response("account list is not an array".to_string()))?;

        let mut accounts = Vec::with_capacity(entries.len());
        for entry in entries {
            let raw = entry.as_str().ok_or_else(|| {
                ProviderError::Response("account entry is not a string".to_string())
            })?;
            accounts.push(raw.to_string());
        }
        Ok(accounts)
    }

    /// Current chain id, served from the cache when possible.
    pub async fn chain_id(&self) -> Result<u64, ProviderError> {
        if let Some(id) = self.cached_chain_id() {
            return Ok(id);
        }
        self.refresh_chain_id().await
    }

    /// Force a chain-id read from the provider and update the cache.
    ///
    /// Negotiation calls this after a switch: the provider may accept the
    /// request without actually changing state, so the cache alone is not
    /// proof.
    pub async fn refresh_chain_id(&self) -> Result<u64, ProviderError> {
        let value = self.request("eth_chainId", json!([])).await?;
        let chain_id = parse_chain_id(&value)?;
        self.store_chain_id(chain_id);
        Ok(chain_id)
    }

    /// Chain id as last observed, without touching the provider.
    pub fn cached_chain_id(&self) -> Option<u64> {
        self.inner.chain_cache.read().ok().and_then(|guard| *guard)
    }

    /// Fold a `chainChanged` notification into the cache.
    pub fn note_chain_changed(&self, chain_id: u64) {
        tracing::debug!(chain_id, "provider reported chain change");
        self.store_chain_id(chain_id);
    }

    fn store_chain_id(&self, chain_id: u64) {
        if let Ok(mut guard) = self.inner.chain_cache.write() {
            *guard = Some(chain_id);
        }
    }

    /// Ask the wallet to switch to the given chain.
    pub async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        self.request(
            "wallet_switchEthereumChain",
            json!([SwitchChainParams::new(chain_id)]),
        )
        .await?;
        Ok(())
    }

    /// Register a chain with the wallet.
    pub async fn add_chain(&self, profile: &ChainProfile) -> Result<(), ProviderError> {
        self.request(
            "wallet_addEthereumChain",
            json!([AddChainParams::from_profile(profile)]),
        )
        .await?;
        Ok(())
    }

    /// Submit a state-changing transaction; returns its hash.
    pub async fn send_transaction(&self, call: &TransactionCall) -> Result<B256, ProviderError> {
        let result = self.request("eth_sendTransaction", json!([call])).await?;
        let raw = result.as_str().ok_or_else(|| {
            ProviderError::Response("transaction hash is not a string".to_string())
        })?;
        raw.parse().map_err(|e| {
            ProviderError::Response(format!("unparseable transaction hash '{raw}': {e}"))
        })
    }

    /// Execute a read-only contract call against the latest block.
    pub async fn call(&self, call: &TransactionCall) -> Result<Bytes, ProviderError> {
        let result = self.request("eth_call", json!([call, "latest"])).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| ProviderError::Response("call result is not a string".to_string()))?;
        raw.parse()
            .map_err(|e| ProviderError::Response(format!("unparseable call result: {e}")))
    }

    /// Fetch a transaction receipt; `None` while the transaction is pending.
    pub async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<ReceiptView>, ProviderError> {
        let result = self
            .request("eth_getTransactionReceipt", json!([format!("{tx_hash}")]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let receipt = serde_json::from_value(result)
            .map_err(|e| ProviderError::Response(format!("unparseable receipt: {e}")))?;
        Ok(Some(receipt))
    }
}
