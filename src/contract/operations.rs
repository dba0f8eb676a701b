//! Token operations against a bound contract.
//!
//! # Responsibilities
//! - Encode calls per the descriptor's ABI entries
//! - Submit state-changing transactions and await inclusion under a
//!   bounded wait
//! - Execute read-only calls and decode their outputs
//! - Re-validate the binding's chain id immediately before submission

use std::time::Duration;

use alloy::dyn_abi::{DynSolValue, JsonAbiExt};
use alloy::json_abi::Function;
use alloy::primitives::{Address, B256, U256};
use alloy::sol;
use alloy::sol_types::SolEvent;
use thiserror::Error;
use tokio::time::{interval, timeout};

use crate::config::OperationConfig;
use crate::contract::binder::{chain_label, BoundContract};
use crate::contract::descriptor::ContractDescriptor;
use crate::provider::rpc::{ReceiptView, TransactionCall};
use crate::provider::types::ProviderError;
use crate::provider::WalletGateway;

sol! {
    /// Standard ERC-721 transfer event; minting emits it with a zero
    /// `from` and the fresh token id in the third topic.
    #[derive(Debug)]
    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
}

/// Input for a mint operation.
#[derive(Debug, Clone)]
pub struct MintRequest {
    /// Metadata location recorded on the token.
    pub token_uri: String,
    /// Key material the contract stores alongside the token.
    pub encryption_key: String,
}

/// Outcome of a successful mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintResult {
    pub token_id: u64,
}

/// Input for a metadata lookup.
#[derive(Debug, Clone, Copy)]
pub struct TokenUriQuery {
    pub token_id: u64,
}

/// Outcome of a metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUriResult {
    pub uri: String,
}

/// Input for a token transfer.
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest {
    pub to: Address,
    pub token_id: u64,
}

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The session left the target chain after binding.
    #[error("binding is stale: session is on chain {}, expected {expected}", chain_label(.actual))]
    StaleBinding { expected: u64, actual: Option<u64> },

    /// The session has no active account anymore.
    #[error("session has no active account")]
    Disconnected,

    /// The wallet user declined to sign.
    #[error("transaction rejected by wallet user: {0}")]
    UserRejected(String),

    /// The chain rejected the transaction.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// Inclusion was not confirmed within the configured bound.
    #[error("transaction not confirmed within {0} seconds")]
    Timeout(u64),

    /// The chain reports no token at the requested id.
    #[error("no token found for the requested id")]
    NotFound,

    /// Transport or provider failure, with the provider message attached.
    #[error("rpc failure: {0}")]
    Rpc(String),

    /// ABI lookup, encoding, or decoding failed.
    #[error("abi codec failure: {0}")]
    Codec(String),
}

fn function_entry<'a>(
    descriptor: &'a ContractDescriptor,
    name: &str,
) -> Result<&'a Function, OperationError> {
    descriptor
        .function(name)
        .ok_or_else(|| OperationError::Codec(format!("descriptor has no '{name}' entry")))
}

fn encode_call(function: &Function, args: &[DynSolValue]) -> Result<String, OperationError> {
    if function.inputs.len() != args.len() {
        return Err(OperationError::Codec(format!(
            "'{}' takes {} arguments, got {}",
            function.name,
            function.inputs.len(),
            args.len()
        )));
    }
    let mut data = function.selector().to_vec();
    data.extend(DynSolValue::Tuple(args.to_vec()).abi_encode_params());
    Ok(format!("0x{}", alloy::primitives::hex::encode(data)))
}

fn map_submit_error(err: ProviderError) -> OperationError {
    match err {
        ProviderError::UserRejected(message) => OperationError::UserRejected(message),
        other => OperationError::Rpc(other.to_string()),
    }
}

fn is_revert_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains("revert")
}

/// Extract the minted token id from the receipt's `Transfer` log.
fn token_id_from_receipt(receipt: &ReceiptView) -> Result<u64, OperationError> {
    for log in &receipt.logs {
        let topics: Vec<B256> = log
            .topics
            .iter()
            .filter_map(|raw| raw.parse().ok())
            .collect();
        if topics.len() == 4 && topics[0] == Transfer::SIGNATURE_HASH {
            let id = U256::from_be_bytes(topics[3].0);
            return u64::try_from(id)
                .map_err(|_| OperationError::Codec("token id exceeds u64 range".to_string()));
        }
    }
    Err(OperationError::Codec(
        "mint receipt carries no Transfer log".to_string(),
    ))
}

/// Mint and read operations on a bound contract.
pub struct TokenOperations {
    config: OperationConfig,
}

impl TokenOperations {
    pub fn new(config: OperationConfig) -> Self {
        Self { config }
    }

    /// Mint a token and wait for inclusion.
    ///
    /// Resolves with the token id decoded from the transaction's
    /// `Transfer` log once the chain confirms the transaction.
    pub async fn mint(
        &self,
        bound: &BoundContract,
        request: MintRequest,
    ) -> Result<MintResult, OperationError> {
        let receipt = self
            .submit(
                bound,
                "mintToken",
                vec![
                    DynSolValue::String(request.token_uri),
                    DynSolValue::String(request.encryption_key),
                ],
            )
            .await?;

        let token_id = token_id_from_receipt(&receipt)?;
        tracing::info!(token_id, "token minted");
        Ok(MintResult { token_id })
    }

    /// Read a token's metadata URI. No signature or confirmation involved.
    pub async fn token_uri(
        &self,
        bound: &BoundContract,
        query: TokenUriQuery,
    ) -> Result<TokenUriResult, OperationError> {
        let outputs = self
            .read(
                bound,
                "tokenURI",
                vec![DynSolValue::Uint(U256::from(query.token_id), 256)],
            )
            .await
            .map_err(not_found_on_revert)?;

        match outputs.into_iter().next() {
            Some(DynSolValue::String(uri)) => Ok(TokenUriResult { uri }),
            other => Err(OperationError::Codec(format!(
                "unexpected tokenURI output: {other:?}"
            ))),
        }
    }

    /// Transfer a token to another address and wait for inclusion.
    pub async fn transfer(
        &self,
        bound: &BoundContract,
        request: TransferRequest,
    ) -> Result<(), OperationError> {
        self.submit(
            bound,
            "transferQube",
            vec![
                DynSolValue::Address(request.to),
                DynSolValue::Uint(U256::from(request.token_id), 256),
            ],
        )
        .await?;
        tracing::info!(token_id = request.token_id, to = %request.to, "token transferred");
        Ok(())
    }

    /// Read the owner of a token id.
    pub async fn owner_of(
        &self,
        bound: &BoundContract,
        token_id: u64,
    ) -> Result<Address, OperationError> {
        let outputs = self
            .read(
                bound,
                "ownerOf",
                vec![DynSolValue::Uint(U256::from(token_id), 256)],
            )
            .await
            .map_err(not_found_on_revert)?;

        match outputs.into_iter().next() {
            Some(DynSolValue::Address(owner)) => Ok(owner),
            other => Err(OperationError::Codec(format!(
                "unexpected ownerOf output: {other:?}"
            ))),
        }
    }

    /// Read the total minted supply.
    pub async fn total_supply(&self, bound: &BoundContract) -> Result<u64, OperationError> {
        let outputs = self.read(bound, "totalSupply", Vec::new()).await?;

        match outputs.into_iter().next() {
            Some(DynSolValue::Uint(supply, _)) => u64::try_from(supply)
                .map_err(|_| OperationError::Codec("supply exceeds u64 range".to_string())),
            other => Err(OperationError::Codec(format!(
                "unexpected totalSupply output: {other:?}"
            ))),
        }
    }

    /// A chain change may have occurred asynchronously since bind time;
    /// nothing touches the provider until this passes.
    fn check_chain(bound: &BoundContract) -> Result<(), OperationError> {
        match bound.session().chain_id() {
            Some(id) if id == bound.chain_id() => Ok(()),
            actual => Err(OperationError::StaleBinding {
                expected: bound.chain_id(),
                actual,
            }),
        }
    }

    async fn submit(
        &self,
        bound: &BoundContract,
        function: &str,
        args: Vec<DynSolValue>,
    ) -> Result<ReceiptView, OperationError> {
        Self::check_chain(bound)?;
        let from = bound
            .session()
            .account()
            .ok_or(OperationError::Disconnected)?;

        let entry = function_entry(bound.descriptor(), function)?;
        let call = TransactionCall {
            from: Some(from.to_string()),
            to: bound.address().to_string(),
            data: encode_call(entry, &args)?,
        };

        let gateway = bound.session().gateway();
        let tx_hash = gateway
            .send_transaction(&call)
            .await
            .map_err(map_submit_error)?;
        tracing::debug!(%tx_hash, function, "transaction submitted, awaiting inclusion");

        self.wait_for_receipt(gateway, tx_hash).await
    }

    async fn wait_for_receipt(
        &self,
        gateway: &WalletGateway,
        tx_hash: B256,
    ) -> Result<ReceiptView, OperationError> {
        let bound_secs = self.config.confirmation_timeout_secs;
        let poll = Duration::from_millis(self.config.receipt_poll_interval_ms);

        let result = timeout(Duration::from_secs(bound_secs), async {
            let mut ticker = interval(poll);

            loop {
                ticker.tick().await;

                match gateway.transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => {
                        if !receipt.succeeded() {
                            return Err(OperationError::Reverted(format!(
                                "transaction {tx_hash} reverted on chain"
                            )));
                        }
                        return Ok(receipt);
                    }
                    Ok(None) => {
                        tracing::debug!(%tx_hash, "transaction pending");
                    }
                    Err(e) => return Err(OperationError::Rpc(e.to_string())),
                }
            }
        })
        .await;

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(OperationError::Timeout(bound_secs)),
        }
    }

    async fn read(
        &self,
        bound: &BoundContract,
        function: &str,
        args: Vec<DynSolValue>,
    ) -> Result<Vec<DynSolValue>, OperationError> {
        Self::check_chain(bound)?;

        let entry = function_entry(bound.descriptor(), function)?;
        let call = TransactionCall {
            from: None,
            to: bound.address().to_string(),
            data: encode_call(entry, &args)?,
        };

        let output = bound
            .session()
            .gateway()
            .call(&call)
            .await
            .map_err(|e| OperationError::Rpc(e.to_string()))?;

        entry
            .abi_decode_output(output.as_ref())
            .map_err(|e| OperationError::Codec(format!("'{function}' output: {e}")))
    }
}

/// Reads keyed by token id revert when the token does not exist.
fn not_found_on_revert(err: OperationError) -> OperationError {
    match err {
        OperationError::Rpc(message) if is_revert_message(&message) => OperationError::NotFound,
        other => other,
    }
}
