//! Provider-boundary types and error definitions.

use thiserror::Error;

/// EIP-1193 code for a user-rejected request.
pub const CODE_USER_REJECTED: i64 = 4001;

/// EIP-1193 code for a chain the wallet does not know about.
pub const CODE_CHAIN_UNREGISTERED: i64 = 4902;

/// Events pushed by the wallet provider.
///
/// Payloads are carried as the raw strings the wallet convention uses;
/// normalization happens where the event is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// `accountsChanged`: the wallet's exposed account list changed.
    /// An empty list means the wallet disconnected from this origin.
    AccountsChanged(Vec<String>),

    /// `chainChanged`: the wallet moved to another chain.
    ChainChanged(String),
}

/// Errors produced at the gateway boundary.
///
/// This is the closed set higher components branch on; raw numeric provider
/// codes never travel past the gateway.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No wallet provider is available at all.
    #[error("no wallet provider available")]
    Unavailable,

    /// The wallet user declined the request prompt.
    #[error("request rejected by wallet user: {0}")]
    UserRejected(String),

    /// The requested chain is not registered with the wallet.
    /// Consumed internally by negotiation; never surfaced past it.
    #[error("chain not registered with the wallet")]
    ChainUnregistered,

    /// The provider or transport failed the request.
    #[error("provider failure: {0}")]
    Rpc(String),

    /// The provider answered with a shape we cannot interpret.
    #[error("malformed provider response: {0}")]
    Response(String),
}
