//! Wallet negotiation and token-mint gateway.
//!
//! Connects an injected (EIP-1193 style) wallet provider to a specific
//! target chain, binds a token contract descriptor to the verified session,
//! and performs mint/read operations against it.
//!
//! # Architecture Overview
//!
//! ```text
//!   UI action
//!       │
//!       ▼
//!   ┌──────────────────────┐  eth_requestAccounts    ┌───────────────────┐
//!   │ WalletSessionManager │────────────────────────▶│                   │
//!   └──────────┬───────────┘                         │                   │
//!              ▼                                     │   WalletGateway   │
//!   ┌──────────────────────┐  wallet_switch/add…     │                   │
//!   │  NetworkNegotiator   │────────────────────────▶│   over a          │
//!   └──────────┬───────────┘                         │   ProviderTrans-  │
//!              ▼                                     │   port (injected  │
//!   ┌──────────────────────┐  (pure, no request)     │   wallet, HTTP    │
//!   │    ContractBinder    │                         │   bridge, or a    │
//!   └──────────┬───────────┘                         │   test double)    │
//!              ▼                                     │                   │
//!   ┌──────────────────────┐  eth_sendTransaction /  │                   │
//!   │   TokenOperations    │────────────────────────▶│                   │
//!   └──────────────────────┘  eth_call / receipts    └───────────────────┘
//! ```
//!
//! Each step must succeed before the next begins; no step retries a prior
//! step's failure. The gateway maps raw provider error codes into a closed
//! error set, so nothing above it ever inspects numeric codes.

// Core subsystems
pub mod config;
pub mod contract;
pub mod provider;
pub mod session;

pub use config::{ChainProfile, DashboardConfig, OperationConfig};
pub use contract::{
    BindError, BoundContract, ContractBinder, ContractDescriptor, MintRequest, MintResult,
    OperationError, TokenOperations, TokenUriQuery, TokenUriResult, TransferRequest,
};
pub use provider::{
    HttpBridgeTransport, ProviderError, ProviderEvent, ProviderTransport, TransportError,
    WalletGateway,
};
pub use session::{
    NetworkError, NetworkNegotiator, SessionError, VerifiedChain, WalletSession,
    WalletSessionManager,
};
