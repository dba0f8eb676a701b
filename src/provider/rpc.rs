//! Wallet-convention JSON-RPC payload shapes and value normalization.
//!
//! # Responsibilities
//! - Serialize request params exactly the way injected wallets expect them
//!   (camelCase fields, hex-encoded chain ids)
//! - Normalize chain-id replies (integer, `0x` hex string, decimal string)
//! - Provide a lenient receipt view that tolerates provider-specific extras

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ChainProfile;
use crate::provider::types::ProviderError;

/// Encode a chain id the way `wallet_switchEthereumChain` expects it:
/// `0x` prefix, lowercase hex, no leading zeros.
pub fn hex_chain_id(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

/// Normalize a chain-id string: `0x` hex or plain decimal.
pub fn parse_chain_id_str(raw: &str) -> Result<u64, ProviderError> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| ProviderError::Response(format!("unparseable chain id '{raw}'")))
}

/// Normalize a chain-id JSON value: number, hex string, or decimal string.
pub fn parse_chain_id(value: &Value) -> Result<u64, ProviderError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ProviderError::Response(format!("chain id out of range: {n}"))),
        Value::String(s) => parse_chain_id_str(s),
        other => Err(ProviderError::Response(format!(
            "chain id is neither number nor string: {other}"
        ))),
    }
}

/// Params entry for `wallet_switchEthereumChain`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    pub chain_id: String,
}

impl SwitchChainParams {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id: hex_chain_id(chain_id),
        }
    }
}

/// Native-currency metadata inside `wallet_addEthereumChain` params.
#[derive(Debug, Clone, Serialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Params entry for `wallet_addEthereumChain`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl AddChainParams {
    /// Build the registration payload from a chain profile.
    pub fn from_profile(profile: &ChainProfile) -> Self {
        Self {
            chain_id: hex_chain_id(profile.chain_id),
            chain_name: profile.display_name.clone(),
            native_currency: NativeCurrency {
                name: profile.currency_symbol.clone(),
                symbol: profile.currency_symbol.clone(),
                decimals: 18,
            },
            rpc_urls: vec![profile.rpc_url.clone()],
            block_explorer_urls: vec![profile.explorer_url.clone()],
        }
    }
}

/// Call object for `eth_sendTransaction` and `eth_call`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionCall {
    /// Sender account. Required for transactions, optional for reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    /// ABI-encoded calldata, `0x`-prefixed hex.
    pub data: String,
}

/// Minimal view of an `eth_getTransactionReceipt` result.
///
/// Providers attach many extra fields; only what the operation layer needs
/// is modeled, everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogView>,
}

impl ReceiptView {
    /// Whether the transaction executed without reverting.
    pub fn succeeded(&self) -> bool {
        !matches!(self.status.as_deref(), Some("0x0") | Some("0x00"))
    }
}

/// Minimal view of a receipt log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct LogView {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: Option<String>,
}
