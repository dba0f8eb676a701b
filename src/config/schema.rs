//! Configuration schema definitions.
//!
//! This module defines the static configuration supplied at process start:
//! the target network, the deployed contract, and operation timing bounds.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::contract::ContractDescriptor;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DashboardConfig {
    /// Target network description.
    pub chain: ChainProfile,

    /// Deployed contract address and interface.
    pub contract: ContractDescriptor,

    /// Operation timing bounds.
    pub operations: OperationConfig,
}

/// Static description of the target network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChainProfile {
    /// Chain id the wallet must be negotiated onto.
    pub chain_id: u64,

    /// RPC endpoint registered with the wallet on `wallet_addEthereumChain`.
    pub rpc_url: String,

    /// Human-readable network name.
    pub display_name: String,

    /// Native currency ticker (name and symbol share it).
    pub currency_symbol: String,

    /// Block explorer base URL.
    pub explorer_url: String,
}

impl Default for ChainProfile {
    fn default() -> Self {
        // Polygon Amoy, where the token contract is deployed.
        Self {
            chain_id: 80002,
            rpc_url: "https://rpc-amoy.polygon.technology".to_string(),
            display_name: "Polygon Amoy Testnet".to_string(),
            currency_symbol: "MATIC".to_string(),
            explorer_url: "https://amoy.polygonscan.com/".to_string(),
        }
    }
}

/// Timing bounds for contract operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OperationConfig {
    /// Upper bound on the wait for transaction inclusion, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt poll cadence while waiting for inclusion, in milliseconds.
    pub receipt_poll_interval_ms: u64,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout_secs: 120,
            receipt_poll_interval_ms: 2_000,
        }
    }
}
