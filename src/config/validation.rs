//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (chain id nonzero, timeouts > 0)
//! - Check URLs and the contract address parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: DashboardConfig → Result<(), Vec<...>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::DashboardConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("chain id must be nonzero")]
    ZeroChainId,

    #[error("invalid {field} URL '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid contract address '{0}'")]
    InvalidContractAddress(String),

    #[error("contract ABI has no function entries")]
    EmptyAbi,

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

fn check_url(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let Err(e) = value.parse::<url::Url>() {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        });
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DashboardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.chain.chain_id == 0 {
        errors.push(ValidationError::ZeroChainId);
    }
    check_url("rpc", &config.chain.rpc_url, &mut errors);
    check_url("explorer", &config.chain.explorer_url, &mut errors);

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(ValidationError::InvalidContractAddress(
            config.contract.address.clone(),
        ));
    }
    if config.contract.functions.is_empty() {
        errors.push(ValidationError::EmptyAbi);
    }

    if config.operations.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "confirmation_timeout_secs",
        });
    }
    if config.operations.receipt_poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "receipt_poll_interval_ms",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
