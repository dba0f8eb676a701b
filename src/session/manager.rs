//! Wallet session establishment and lifecycle.
//!
//! # Responsibilities
//! - Request account access and expose the active account
//! - Track provider-emitted `accountsChanged` / `chainChanged` events
//! - Detect provider absence before any request is issued

use std::sync::{Arc, RwLock};

use alloy::primitives::Address;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

use crate::provider::rpc::parse_chain_id_str;
use crate::provider::types::{ProviderError, ProviderEvent};
use crate::provider::WalletGateway;

/// Errors establishing a wallet session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No injected provider present. Fatal to the whole flow.
    #[error("no wallet provider detected")]
    ProviderMissing,

    /// The wallet answered with an empty account list.
    #[error("wallet returned no accounts")]
    NoAccounts,

    /// The wallet user declined the connection prompt.
    #[error("connection rejected by wallet user: {0}")]
    Rejected(String),

    /// Anything else the provider failed with.
    #[error("wallet provider failure: {0}")]
    Provider(String),
}

#[derive(Debug)]
struct SessionState {
    account: Option<Address>,
}

/// An established wallet session.
///
/// Cheap to clone; clones share account state and the gateway. The session
/// transitions to disconnected on `disconnect()` or when the provider
/// empties its account list.
#[derive(Debug, Clone)]
pub struct WalletSession {
    gateway: WalletGateway,
    state: Arc<RwLock<SessionState>>,
}

impl WalletSession {
    /// Active account, if still connected.
    pub fn account(&self) -> Option<Address> {
        self.state.read().ok().and_then(|guard| guard.account)
    }

    /// Chain id as last observed through the gateway.
    pub fn chain_id(&self) -> Option<u64> {
        self.gateway.cached_chain_id()
    }

    pub fn is_connected(&self) -> bool {
        self.account().is_some()
    }

    /// Drop the active account. The provider-side connection is not
    /// retractable; this only forgets it locally.
    pub fn disconnect(&self) {
        if let Ok(mut guard) = self.state.write() {
            guard.account = None;
        }
        tracing::info!("wallet session disconnected");
    }

    pub fn gateway(&self) -> &WalletGateway {
        &self.gateway
    }

    fn spawn_event_task(&self) {
        let Some(mut events) = self.gateway.events() else {
            return;
        };
        let state = Arc::clone(&self.state);
        let gateway = self.gateway.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(ProviderEvent::AccountsChanged(accounts)) => {
                        let account = accounts.first().and_then(|raw| raw.parse().ok());
                        if account.is_none() {
                            tracing::info!("provider emptied the account list, disconnecting");
                        }
                        if let Ok(mut guard) = state.write() {
                            guard.account = account;
                        }
                    }
                    Ok(ProviderEvent::ChainChanged(raw)) => match parse_chain_id_str(&raw) {
                        Ok(chain_id) => gateway.note_chain_changed(chain_id),
                        Err(e) => {
                            tracing::warn!(error = %e, "ignoring malformed chainChanged payload");
                        }
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "provider event stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}

/// Establishes wallet sessions over a gateway.
pub struct WalletSessionManager {
    gateway: WalletGateway,
}

impl WalletSessionManager {
    pub fn new(gateway: WalletGateway) -> Self {
        Self { gateway }
    }

    /// Request account access and build a session around the first
    /// returned account.
    pub async fn connect(&self) -> Result<WalletSession, SessionError> {
        // Checked before any request, so a missing provider fails without
        // suspending.
        if !self.gateway.is_available() {
            return Err(SessionError::ProviderMissing);
        }

        let accounts = self
            .gateway
            .request_accounts()
            .await
            .map_err(|e| match e {
                ProviderError::UserRejected(message) => SessionError::Rejected(message),
                other => SessionError::Provider(other.to_string()),
            })?;

        let raw = accounts.first().ok_or(SessionError::NoAccounts)?;
        let account: Address = raw
            .parse()
            .map_err(|e| SessionError::Provider(format!("invalid account '{raw}': {e}")))?;

        let chain_id = self
            .gateway
            .chain_id()
            .await
            .map_err(|e| SessionError::Provider(e.to_string()))?;

        let session = WalletSession {
            gateway: self.gateway.clone(),
            state: Arc::new(RwLock::new(SessionState {
                account: Some(account),
            })),
        };
        session.spawn_event_task();

        tracing::info!(account = %account, chain_id, "wallet session established");
        Ok(session)
    }
}

/// Abbreviate an address for display: `0x1234…abcd`.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
