//! Wallet session and network negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! manager.rs: eth_requestAccounts → WalletSession (account + events)
//! negotiator.rs: chain check → switch → (add + retry once) → verify
//! ```
//!
//! # Design Decisions
//! - Negotiation is the only component that forces a chain-id re-read
//! - A single-slot guard serializes concurrent negotiations; stacked
//!   wallet switch prompts have undefined wallet-side behavior
//! - Provider events update session state but never trigger negotiation;
//!   that happens only when the next operation is attempted

pub mod manager;
pub mod negotiator;

pub use manager::{short_address, SessionError, WalletSession, WalletSessionManager};
pub use negotiator::{NetworkError, NetworkNegotiator, VerifiedChain};
