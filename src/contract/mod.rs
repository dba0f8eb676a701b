//! Contract binding and token operations subsystem.
//!
//! # Data Flow
//! ```text
//! ContractDescriptor (address + JSON ABI, from config)
//!     → binder.rs (pure composition with a verified session)
//!     → operations.rs (encode per the ABI, submit/read, decode)
//! ```
//!
//! # Design Decisions
//! - Binding performs no network call; it is deferred execution
//! - Every operation re-validates the session's chain id immediately
//!   before submission
//! - Calldata is built dynamically from the descriptor's ABI entries, so
//!   the same machinery serves every contract function

pub mod binder;
pub mod descriptor;
pub mod operations;

pub use binder::{BindError, BoundContract, ContractBinder};
pub use descriptor::ContractDescriptor;
pub use operations::{
    MintRequest, MintResult, OperationError, TokenOperations, TokenUriQuery, TokenUriResult,
    TransferRequest,
};
