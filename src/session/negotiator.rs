//! Network negotiation: moving the wallet onto the target chain.
//!
//! # Responsibilities
//! - Verify the provider's chain id against the target profile
//! - Switch chains, registering the chain with the wallet first when it
//!   reports the chain as unknown (the one automatic recovery path)
//! - Confirm the provider actually changed state after a switch
//! - Serialize concurrent negotiations behind a single-slot guard

use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::ChainProfile;
use crate::provider::types::ProviderError;
use crate::provider::WalletGateway;

/// Proof that the provider was observed on the target chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedChain {
    pub chain_id: u64,
}

/// Errors surfaced by negotiation.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The wallet user declined a switch or registration prompt.
    /// Recoverable by re-invoking once the user is ready.
    #[error("chain change rejected by wallet user: {0}")]
    Rejected(String),

    /// The provider failed the request for any other reason.
    #[error("provider failure during negotiation: {0}")]
    ProviderFailure(String),

    /// The provider accepted the switch but still reports another chain.
    #[error("chain verification failed: provider reports {actual}, target is {expected}")]
    VerificationFailed { expected: u64, actual: u64 },
}

/// Negotiates a wallet provider onto a fixed target chain.
///
/// One negotiator serves one provider; the in-flight guard is what keeps
/// two concurrent `ensure` calls from stacking switch prompts on the
/// wallet UI.
pub struct NetworkNegotiator {
    chain: ChainProfile,
    in_flight: Mutex<()>,
}

impl NetworkNegotiator {
    pub fn new(chain: ChainProfile) -> Self {
        Self {
            chain,
            in_flight: Mutex::new(()),
        }
    }

    pub fn target_chain_id(&self) -> u64 {
        self.chain.chain_id
    }

    /// Ensure the provider is on the target chain.
    ///
    /// Idempotent and cheap to re-invoke: when the gateway already
    /// observes the target chain this returns without issuing a provider
    /// request. Otherwise it switches, registering the chain first if the
    /// wallet does not know it (one add, one retried switch, nothing
    /// more), then re-reads the chain id to confirm the provider really
    /// moved.
    pub async fn ensure(&self, gateway: &WalletGateway) -> Result<VerifiedChain, NetworkError> {
        let target = self.chain.chain_id;

        if gateway.chain_id().await.map_err(provider_failure)? == target {
            return Ok(VerifiedChain { chain_id: target });
        }

        let _slot = self.in_flight.lock().await;

        // A negotiation that completed while we waited for the slot makes
        // this call a no-op.
        if gateway.chain_id().await.map_err(provider_failure)? == target {
            return Ok(VerifiedChain { chain_id: target });
        }

        tracing::info!(target_chain = target, "switching wallet to target chain");
        match gateway.switch_chain(target).await {
            Ok(()) => {}
            Err(ProviderError::ChainUnregistered) => {
                tracing::info!(
                    target_chain = target,
                    chain = %self.chain.display_name,
                    "chain unknown to wallet, registering it"
                );
                gateway.add_chain(&self.chain).await.map_err(switch_error)?;
                gateway.switch_chain(target).await.map_err(switch_error)?;
            }
            Err(e) => return Err(switch_error(e)),
        }

        // The provider can accept the request without changing state;
        // surface that instead of silently carrying a wrong chain.
        let actual = gateway.refresh_chain_id().await.map_err(provider_failure)?;
        if actual != target {
            return Err(NetworkError::VerificationFailed {
                expected: target,
                actual,
            });
        }

        tracing::info!(chain_id = actual, "wallet verified on target chain");
        Ok(VerifiedChain { chain_id: actual })
    }
}

fn switch_error(err: ProviderError) -> NetworkError {
    match err {
        ProviderError::UserRejected(message) => NetworkError::Rejected(message),
        other => NetworkError::ProviderFailure(other.to_string()),
    }
}

fn provider_failure(err: ProviderError) -> NetworkError {
    NetworkError::ProviderFailure(err.to_string())
}
