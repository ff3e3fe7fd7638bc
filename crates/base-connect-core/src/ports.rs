use alloy::primitives::{Address, Bytes};
use thiserror::Error;

use crate::domain::{ChainInfo, ProviderEvent};

/// Wallet JSON-RPC error codes (EIP-1193 / EIP-3326).
pub const USER_REJECTED_REQUEST: i64 = 4001;
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("wallet rejected request ({code}): {message}")]
    Rejected { code: i64, message: String },
}

impl PortError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, PortError::Rejected { code, .. } if *code == USER_REJECTED_REQUEST)
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        matches!(self, PortError::Rejected { code, .. } if *code == UNRECOGNIZED_CHAIN)
    }
}

pub trait ProviderPort {
    /// Prompts the wallet for account access (`eth_requestAccounts`).
    fn request_accounts(&self) -> Result<Vec<Address>, PortError>;
    /// Already-authorized accounts without prompting (`eth_accounts`).
    fn accounts(&self) -> Result<Vec<Address>, PortError>;
    fn chain_id(&self) -> Result<u64, PortError>;
    fn personal_sign(&self, message: &str, signer: Address) -> Result<Bytes, PortError>;
    fn switch_chain(&self, chain: &ChainInfo) -> Result<(), PortError>;
    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError>;
}
