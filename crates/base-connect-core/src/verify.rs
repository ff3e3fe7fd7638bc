//! Local signature verification.
//!
//! Recovers the signer of an EIP-191 personal message and compares it with
//! the claimed address. The curve math lives in `alloy`.

use alloy::primitives::{Address, PrimitiveSignature};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid signature encoding: {0}")]
    Encoding(String),
    #[error("signer recovery failed: {0}")]
    Recovery(String),
}

pub fn recover_signer(message: &str, signature: &[u8]) -> Result<Address, VerifyError> {
    let signature = PrimitiveSignature::from_raw(signature)
        .map_err(|e| VerifyError::Encoding(e.to_string()))?;
    signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| VerifyError::Recovery(e.to_string()))
}

pub fn verify_message(
    address: Address,
    message: &str,
    signature: &[u8],
) -> Result<bool, VerifyError> {
    let recovered = recover_signer(message, signature)?;
    tracing::debug!(%recovered, expected = %address, "recovered personal_sign signer");
    Ok(recovered == address)
}
