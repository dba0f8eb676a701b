//! Contract binding: pure composition of a verified session and a
//! descriptor into a callable handle.

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::ChainProfile;
use crate::contract::descriptor::ContractDescriptor;
use crate::session::WalletSession;

pub(crate) fn chain_label(chain: &Option<u64>) -> String {
    match chain {
        Some(id) => id.to_string(),
        None => "unknown".to_string(),
    }
}

/// Errors binding a descriptor to a session.
#[derive(Debug, Error)]
pub enum BindError {
    /// The session is not on the target chain. The caller must re-run
    /// negotiation first; the binder never negotiates on its behalf.
    #[error("session is on chain {}, target is {expected}", chain_label(.actual))]
    WrongNetwork { expected: u64, actual: Option<u64> },

    /// The descriptor's address is not a well-formed 20-byte hex value.
    #[error("invalid contract descriptor: {0}")]
    InvalidDescriptor(String),
}

/// Produces callable contract handles bound to verified sessions.
pub struct ContractBinder {
    chain: ChainProfile,
}

/// A descriptor paired with a same-chain session, ready for invocation.
///
/// Valid only while the session remains on the target chain; operations
/// re-check that before every submission.
#[derive(Debug, Clone)]
pub struct BoundContract {
    address: Address,
    descriptor: ContractDescriptor,
    session: WalletSession,
    chain_id: u64,
}

impl ContractBinder {
    pub fn new(chain: ChainProfile) -> Self {
        Self { chain }
    }

    /// Bind a descriptor to a session. Pure composition: no network call
    /// is made and no state is touched.
    pub fn bind(
        &self,
        session: &WalletSession,
        descriptor: &ContractDescriptor,
    ) -> Result<BoundContract, BindError> {
        let expected = self.chain.chain_id;

        // Read synchronously so the handle never closes over a value older
        // than the last completed negotiation.
        match session.chain_id() {
            Some(id) if id == expected => {}
            actual => return Err(BindError::WrongNetwork { expected, actual }),
        }

        let address: Address = descriptor.address.parse().map_err(|e| {
            BindError::InvalidDescriptor(format!(
                "contract address '{}': {}",
                descriptor.address, e
            ))
        })?;

        Ok(BoundContract {
            address,
            descriptor: descriptor.clone(),
            session: session.clone(),
            chain_id: expected,
        })
    }
}

impl BoundContract {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// The chain id the binding was verified against.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}
