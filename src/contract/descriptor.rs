//! Static pairing of a deployed contract address and its interface.

use alloy::json_abi::Function;
use serde::{Deserialize, Serialize};

/// Deployed address of the agent-token contract on Polygon Amoy.
pub const TOKEN_CONTRACT_ADDRESS: &str = "0x632E1d32e34F0A690635BBcbec0D066daa448ede";

/// A contract address plus the ordered function signatures callable on it.
///
/// The ABI uses the standard Solidity JSON shape, so a descriptor can be
/// loaded from the artifacts a contract build emits. Immutable once built.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractDescriptor {
    /// 20-byte hex contract address. Validated when the descriptor is
    /// bound, not here, so config loading stays infallible.
    pub address: String,

    /// Ordered function signatures.
    #[serde(rename = "abi")]
    pub functions: Vec<Function>,
}

impl ContractDescriptor {
    pub fn new(address: impl Into<String>, functions: Vec<Function>) -> Self {
        Self {
            address: address.into(),
            functions,
        }
    }

    /// Look up a function entry by name. First match wins, preserving the
    /// descriptor's declared order.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl Default for ContractDescriptor {
    fn default() -> Self {
        Self {
            address: TOKEN_CONTRACT_ADDRESS.to_string(),
            functions: default_token_abi(),
        }
    }
}

/// The agent-token contract interface.
fn default_token_abi() -> Vec<Function> {
    serde_json::from_value(serde_json::json!([
        {
            "name": "mintToken",
            "inputs": [
                { "name": "tokenURI", "type": "string" },
                { "name": "encryptionKey", "type": "string" }
            ],
            "outputs": [{ "name": "tokenId", "type": "uint256" }],
            "stateMutability": "nonpayable"
        },
        {
            "name": "tokenURI",
            "inputs": [{ "name": "tokenId", "type": "uint256" }],
            "outputs": [{ "name": "uri", "type": "string" }],
            "stateMutability": "view"
        },
        {
            "name": "transferQube",
            "inputs": [
                { "name": "to", "type": "address" },
                { "name": "tokenId", "type": "uint256" }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "name": "ownerOf",
            "inputs": [{ "name": "tokenId", "type": "uint256" }],
            "outputs": [{ "name": "owner", "type": "address" }],
            "stateMutability": "view"
        },
        {
            "name": "totalSupply",
            "inputs": [],
            "outputs": [{ "name": "supply", "type": "uint256" }],
            "stateMutability": "view"
        }
    ]))
    .expect("built-in token ABI is well-formed")
}
