//! Wallet provider integration subsystem.
//!
//! # Data Flow
//! ```text
//! Injected wallet / HTTP bridge / test double
//!     → transport.rs (raw request + event primitives)
//!     → gateway.rs (typed requests, error-code mapping, chain-id cache)
//!     → session & contract layers (never see raw codes or wire shapes)
//! ```
//!
//! # Design Decisions
//! - The single injected-provider object is an explicit `ProviderTransport`
//!   parameter, never ambient global state
//! - Raw EIP-1193 error codes (4001, 4902, …) are mapped to tagged variants
//!   at the gateway boundary
//! - The gateway owns the chain-id cache; only negotiation forces a re-read

pub mod gateway;
pub mod rpc;
pub mod transport;
pub mod types;

pub use gateway::WalletGateway;
pub use transport::{HttpBridgeTransport, ProviderTransport, TransportError};
pub use types::{ProviderError, ProviderEvent};
