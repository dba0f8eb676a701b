//! Shared scripted wallet transport for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{keccak256, Address, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{broadcast, Notify};

use tokengate::{ProviderEvent, ProviderTransport, TransportError};

pub const CONTRACT_ADDRESS: &str = "0x632E1d32e34F0A690635BBcbec0D066daa448ede";
pub const ACCOUNT: &str = "0x14b02B70a9740503ef4294FB4CAAf08e2759deA0";

/// Knobs controlling how the mock wallet misbehaves.
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Reply 4902 to switch requests until the chain is registered.
    pub chain_unknown: bool,
    /// Accept switch requests without actually changing the chain.
    pub ignore_switch: bool,
    /// Reply 4001 to switch requests.
    pub reject_switch: bool,
    /// Reply 4001 to eth_sendTransaction.
    pub reject_transactions: bool,
    /// Keep every transaction pending (no receipts).
    pub withhold_receipts: bool,
}

#[derive(Debug, Clone)]
pub struct MintedToken {
    pub uri: String,
    pub encryption_key: String,
    pub owner: String,
}

/// A programmable in-memory wallet provider with a tiny token contract
/// behind it. Records every method call for assertions.
#[derive(Debug)]
pub struct MockWallet {
    chain_id: Mutex<u64>,
    accounts: Mutex<Vec<String>>,
    behavior: Mutex<MockBehavior>,
    chain_registered: Mutex<bool>,
    hold_switch: Mutex<Option<Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
    last_added_chain: Mutex<Option<Value>>,
    tokens: Mutex<HashMap<u64, MintedToken>>,
    next_token_id: AtomicU64,
    receipts: Mutex<HashMap<String, Value>>,
    events: broadcast::Sender<ProviderEvent>,
}

impl MockWallet {
    pub fn new(chain_id: u64) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            chain_id: Mutex::new(chain_id),
            accounts: Mutex::new(vec![ACCOUNT.to_string()]),
            behavior: Mutex::new(MockBehavior::default()),
            chain_registered: Mutex::new(false),
            hold_switch: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            last_added_chain: Mutex::new(None),
            tokens: Mutex::new(HashMap::new()),
            next_token_id: AtomicU64::new(1),
            receipts: Mutex::new(HashMap::new()),
            events,
        })
    }

    pub fn set_behavior(&self, update: impl FnOnce(&mut MockBehavior)) {
        update(&mut self.behavior.lock().unwrap());
    }

    /// Move the wallet to another chain, emitting `chainChanged`.
    pub fn set_chain(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
        let _ = self
            .events
            .send(ProviderEvent::ChainChanged(format!("0x{chain_id:x}")));
    }

    pub fn chain(&self) -> u64 {
        *self.chain_id.lock().unwrap()
    }

    /// Replace the account list, emitting `accountsChanged`.
    pub fn set_accounts(&self, accounts: Vec<String>) {
        *self.accounts.lock().unwrap() = accounts.clone();
        let _ = self.events.send(ProviderEvent::AccountsChanged(accounts));
    }

    /// Hold every switch request until the returned handle is notified.
    pub fn hold_switch(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold_switch.lock().unwrap() = Some(Arc::clone(&notify));
        notify
    }

    pub fn calls_for(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.as_str() == method)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_added_chain(&self) -> Option<Value> {
        self.last_added_chain.lock().unwrap().clone()
    }

    pub fn token(&self, token_id: u64) -> Option<MintedToken> {
        self.tokens.lock().unwrap().get(&token_id).cloned()
    }

    fn rpc_error(code: i64, message: &str) -> TransportError {
        TransportError::Rpc {
            code,
            message: message.to_string(),
        }
    }

    async fn handle_switch(&self, params: &Value) -> Result<Value, TransportError> {
        let hold = self.hold_switch.lock().unwrap().clone();
        if let Some(notify) = hold {
            notify.notified().await;
        }

        let behavior = self.behavior.lock().unwrap().clone();
        if behavior.reject_switch {
            return Err(Self::rpc_error(4001, "User rejected the request"));
        }
        if behavior.chain_unknown && !*self.chain_registered.lock().unwrap() {
            return Err(Self::rpc_error(4902, "Unrecognized chain ID"));
        }

        let raw = params[0]["chainId"]
            .as_str()
            .ok_or_else(|| Self::rpc_error(-32602, "missing chainId param"))?;
        let target = u64::from_str_radix(raw.trim_start_matches("0x"), 16)
            .map_err(|_| Self::rpc_error(-32602, "malformed chainId param"))?;

        if !behavior.ignore_switch {
            self.set_chain(target);
        }
        Ok(Value::Null)
    }

    fn handle_send_transaction(&self, params: &Value) -> Result<Value, TransportError> {
        if self.behavior.lock().unwrap().reject_transactions {
            return Err(Self::rpc_error(4001, "User rejected the request"));
        }

        let call = &params[0];
        let from = call["from"].as_str().unwrap_or_default().to_string();
        let data = decode_hex(call["data"].as_str().unwrap_or_default())?;
        if data.len() < 4 {
            return Err(Self::rpc_error(-32000, "execution reverted"));
        }

        if data[..4] == keccak256("mintToken(string,string)")[..4] {
            let (uri, key) = decode_two_strings(&data[4..])?;
            let token_id = self.next_token_id.fetch_add(1, Ordering::SeqCst);
            self.tokens.lock().unwrap().insert(
                token_id,
                MintedToken {
                    uri,
                    encryption_key: key,
                    owner: from.clone(),
                },
            );
            let tx_hash = format!("0x{:064x}", 0xaa00 + token_id);
            self.store_mint_receipt(&tx_hash, &from, token_id);
            return Ok(json!(tx_hash));
        }

        if data[..4] == keccak256("transferQube(address,uint256)")[..4] {
            let (to, token_id) = decode_transfer_args(&data[4..])?;
            let mut tokens = self.tokens.lock().unwrap();
            let token = tokens
                .get_mut(&token_id)
                .ok_or_else(|| Self::rpc_error(-32000, "execution reverted"))?;
            token.owner = format!("{to}");
            let tx_hash = format!("0x{:064x}", 0xbb00 + token_id);
            self.receipts.lock().unwrap().insert(
                tx_hash.clone(),
                json!({ "status": "0x1", "transactionHash": tx_hash, "logs": [] }),
            );
            return Ok(json!(tx_hash));
        }

        Err(Self::rpc_error(-32000, "execution reverted"))
    }

    fn store_mint_receipt(&self, tx_hash: &str, owner: &str, token_id: u64) {
        let transfer_sig = format!(
            "0x{}",
            hex_bytes(keccak256("Transfer(address,address,uint256)").as_slice())
        );
        let receipt = json!({
            "status": "0x1",
            "transactionHash": tx_hash,
            "blockNumber": "0x1",
            "logs": [{
                "address": CONTRACT_ADDRESS,
                "topics": [
                    transfer_sig,
                    format!("0x{:064x}", 0),
                    address_topic(owner),
                    format!("0x{token_id:064x}"),
                ],
                "data": "0x"
            }]
        });
        self.receipts
            .lock()
            .unwrap()
            .insert(tx_hash.to_string(), receipt);
    }

    fn handle_call(&self, params: &Value) -> Result<Value, TransportError> {
        let data = decode_hex(params[0]["data"].as_str().unwrap_or_default())?;
        if data.len() < 4 {
            return Err(Self::rpc_error(-32000, "execution reverted"));
        }

        if data[..4] == keccak256("tokenURI(uint256)")[..4] {
            let token_id = decode_uint_arg(&data[4..])?;
            let tokens = self.tokens.lock().unwrap();
            let token = tokens.get(&token_id).ok_or_else(|| {
                Self::rpc_error(3, "execution reverted: ERC721: invalid token ID")
            })?;
            return Ok(encode_outputs(vec![DynSolValue::String(token.uri.clone())]));
        }

        if data[..4] == keccak256("ownerOf(uint256)")[..4] {
            let token_id = decode_uint_arg(&data[4..])?;
            let tokens = self.tokens.lock().unwrap();
            let token = tokens.get(&token_id).ok_or_else(|| {
                Self::rpc_error(3, "execution reverted: ERC721: invalid token ID")
            })?;
            let owner: Address = token.owner.parse().unwrap_or(Address::ZERO);
            return Ok(encode_outputs(vec![DynSolValue::Address(owner)]));
        }

        if data[..4] == keccak256("totalSupply()")[..4] {
            let supply = self.tokens.lock().unwrap().len() as u64;
            return Ok(encode_outputs(vec![DynSolValue::Uint(
                U256::from(supply),
                256,
            )]));
        }

        Err(Self::rpc_error(-32000, "execution reverted"))
    }
}

#[async_trait]
impl ProviderTransport for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(method.to_string());

        match method {
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.chain()))),
            "eth_requestAccounts" | "eth_accounts" => {
                Ok(json!(self.accounts.lock().unwrap().clone()))
            }
            "wallet_switchEthereumChain" => self.handle_switch(&params).await,
            "wallet_addEthereumChain" => {
                *self.chain_registered.lock().unwrap() = true;
                *self.last_added_chain.lock().unwrap() = Some(params[0].clone());
                Ok(Value::Null)
            }
            "eth_sendTransaction" => self.handle_send_transaction(&params),
            "eth_call" => self.handle_call(&params),
            "eth_getTransactionReceipt" => {
                if self.behavior.lock().unwrap().withhold_receipts {
                    return Ok(Value::Null);
                }
                let hash = params[0].as_str().unwrap_or_default();
                Ok(self
                    .receipts
                    .lock()
                    .unwrap()
                    .get(hash)
                    .cloned()
                    .unwrap_or(Value::Null))
            }
            other => Err(Self::rpc_error(
                -32601,
                &format!("the method {other} does not exist"),
            )),
        }
    }

    fn events(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

fn decode_hex(raw: &str) -> Result<Vec<u8>, TransportError> {
    alloy::primitives::hex::decode(raw)
        .map_err(|e| MockWallet::rpc_error(-32602, &format!("bad calldata: {e}")))
}

fn hex_bytes(bytes: &[u8]) -> String {
    alloy::primitives::hex::encode(bytes)
}

fn address_topic(address: &str) -> String {
    format!("0x{:0>64}", address.trim_start_matches("0x").to_lowercase())
}

fn encode_outputs(values: Vec<DynSolValue>) -> Value {
    let encoded = DynSolValue::Tuple(values).abi_encode_params();
    json!(format!("0x{}", hex_bytes(&encoded)))
}

fn decode_two_strings(data: &[u8]) -> Result<(String, String), TransportError> {
    let decoded = DynSolType::Tuple(vec![DynSolType::String, DynSolType::String])
        .abi_decode_params(data)
        .map_err(|e| MockWallet::rpc_error(-32602, &format!("bad mint args: {e}")))?;
    match decoded {
        DynSolValue::Tuple(mut values) if values.len() == 2 => {
            let key = match values.pop() {
                Some(DynSolValue::String(s)) => s,
                _ => return Err(MockWallet::rpc_error(-32602, "bad mint args")),
            };
            let uri = match values.pop() {
                Some(DynSolValue::String(s)) => s,
                _ => return Err(MockWallet::rpc_error(-32602, "bad mint args")),
            };
            Ok((uri, key))
        }
        _ => Err(MockWallet::rpc_error(-32602, "bad mint args")),
    }
}

fn decode_transfer_args(data: &[u8]) -> Result<(Address, u64), TransportError> {
    let decoded = DynSolType::Tuple(vec![DynSolType::Address, DynSolType::Uint(256)])
        .abi_decode_params(data)
        .map_err(|e| MockWallet::rpc_error(-32602, &format!("bad transfer args: {e}")))?;
    match decoded {
        DynSolValue::Tuple(values) if values.len() == 2 => match (&values[0], &values[1]) {
            (DynSolValue::Address(to), DynSolValue::Uint(id, _)) => {
                let id = u64::try_from(*id)
                    .map_err(|_| MockWallet::rpc_error(-32602, "token id out of range"))?;
                Ok((*to, id))
            }
            _ => Err(MockWallet::rpc_error(-32602, "bad transfer args")),
        },
        _ => Err(MockWallet::rpc_error(-32602, "bad transfer args")),
    }
}

fn decode_uint_arg(data: &[u8]) -> Result<u64, TransportError> {
    if data.len() < 32 {
        return Err(MockWallet::rpc_error(-32602, "missing uint argument"));
    }
    let value = U256::from_be_slice(&data[..32]);
    u64::try_from(value).map_err(|_| MockWallet::rpc_error(-32602, "uint out of range"))
}
