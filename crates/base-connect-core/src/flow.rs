//! Page state for the sign / verify card.

use alloy::primitives::{Address, Bytes};

use crate::ports::PortError;
use crate::verify::VerifyError;

pub const ALERT_EMPTY_MESSAGE: &str = "Please enter a message to sign";
pub const ALERT_SIGN_FAILED: &str = "Failed to sign message";
pub const ALERT_SWITCH_FAILED: &str = "Failed to switch to Base network";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignFlow {
    /// Live contents of the input box.
    pub message: String,
    /// Exact text the current signature was produced over.
    pub signed_message: String,
    pub signature: Option<Bytes>,
    pub verified: Option<bool>,
    pub is_signing: bool,
    pub is_verifying: bool,
    alert: Option<String>,
}

/// Inputs for one verification run, captured when the user clicks verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    pub address: Address,
    pub message: String,
    pub signature: Bytes,
}

impl SignFlow {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn can_sign(&self) -> bool {
        !self.message.trim().is_empty() && !self.is_signing
    }

    /// Starts a sign request. Returns the text to hand to the wallet, or
    /// `None` after raising an alert for a blank message.
    pub fn begin_sign(&mut self) -> Option<String> {
        if self.message.trim().is_empty() {
            self.raise_alert(ALERT_EMPTY_MESSAGE);
            return None;
        }
        self.is_signing = true;
        self.verified = None;
        self.signature = None;
        Some(self.message.clone())
    }

    pub fn finish_sign(&mut self, message: String, result: Result<Bytes, PortError>) {
        match result {
            Ok(signature) => {
                self.signature = Some(signature);
                self.signed_message = message;
                self.verified = None;
            }
            Err(e) => {
                tracing::error!("Error signing message: {e}");
                self.raise_alert(ALERT_SIGN_FAILED);
            }
        }
        self.is_signing = false;
    }

    /// Needs a signature, a signed message and a connected address.
    pub fn begin_verify(&mut self, address: Option<Address>) -> Option<VerifyRequest> {
        let address = address?;
        let signature = self.signature.clone()?;
        if self.signed_message.is_empty() {
            return None;
        }
        self.is_verifying = true;
        Some(VerifyRequest {
            address,
            message: self.signed_message.clone(),
            signature,
        })
    }

    pub fn finish_verify(&mut self, result: Result<bool, VerifyError>) {
        self.verified = Some(match result {
            Ok(valid) => valid,
            Err(e) => {
                tracing::error!("Error verifying signature: {e}");
                false
            }
        });
        self.is_verifying = false;
    }

    pub fn alert_switch_failed(&mut self, error: &PortError) {
        tracing::error!("Error switching chain: {error}");
        self.raise_alert(ALERT_SWITCH_FAILED);
    }

    pub fn raise_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Drops the signature state, used when the wallet disconnects.
    pub fn reset_signature(&mut self) {
        self.signed_message.clear();
        self.signature = None;
        self.verified = None;
        self.is_signing = false;
        self.is_verifying = false;
    }
}

impl VerifyRequest {
    pub fn run(&self) -> Result<bool, VerifyError> {
        crate::verify::verify_message(self.address, &self.message, &self.signature)
    }
}
