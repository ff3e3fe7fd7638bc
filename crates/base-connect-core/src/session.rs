use alloy::primitives::Address;

use crate::domain::{
    chain_display_name, is_supported_chain, AccountSnapshot, Balance, ProviderEvent,
    ProviderEventKind,
};
use crate::ports::PortError;
use crate::state_machine::{connection_transition, ConnectionAction, ConnectionStatus, StateTransition};

/// What the page knows about the wallet on the other side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub status: ConnectionStatus,
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub balance: Option<Balance>,
}

impl WalletSession {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected && self.address.is_some()
    }

    /// True only for a connected wallet on a chain other than Base or Base Sepolia.
    pub fn wrong_network(&self) -> bool {
        match self.chain_id {
            Some(id) if self.is_connected() => !is_supported_chain(id),
            _ => false,
        }
    }

    pub fn chain_name(&self) -> String {
        self.chain_id
            .map(chain_display_name)
            .unwrap_or_else(|| "Unknown".to_owned())
    }

    /// Account and chain worth remembering across restarts.
    pub fn snapshot(&self) -> Option<AccountSnapshot> {
        if !self.is_connected() {
            return None;
        }
        Some(AccountSnapshot {
            address: self.address?,
            chain_id: self.chain_id?,
        })
    }

    pub fn apply(&mut self, action: ConnectionAction) -> Result<StateTransition, PortError> {
        let (to, transition) = connection_transition(self.status, action)?;
        self.status = to;
        if to == ConnectionStatus::Disconnected {
            self.address = None;
            self.chain_id = None;
            self.balance = None;
        }
        Ok(transition)
    }

    pub fn establish(
        &mut self,
        address: Address,
        chain_id: u64,
    ) -> Result<StateTransition, PortError> {
        let transition = self.apply(ConnectionAction::Established)?;
        if self.address != Some(address) || self.chain_id != Some(chain_id) {
            self.balance = None;
        }
        self.address = Some(address);
        self.chain_id = Some(chain_id);
        Ok(transition)
    }

    /// Folds one wallet event into the session. Returns the connection
    /// transition it caused, if any.
    pub fn apply_event(
        &mut self,
        event: &ProviderEvent,
    ) -> Result<Option<StateTransition>, PortError> {
        match event.kind {
            ProviderEventKind::AccountsChanged => {
                let accounts: Vec<Address> = serde_json::from_str(&event.value).map_err(|e| {
                    PortError::Validation(format!("accountsChanged payload: {e}"))
                })?;
                match accounts.first().copied() {
                    None if self.status == ConnectionStatus::Connected => {
                        self.apply(ConnectionAction::AccountsEmptied).map(Some)
                    }
                    None => Ok(None),
                    Some(address) if self.status == ConnectionStatus::Connected => {
                        if self.address != Some(address) {
                            self.address = Some(address);
                            self.balance = None;
                        }
                        Ok(None)
                    }
                    Some(_) => Ok(None),
                }
            }
            ProviderEventKind::ChainChanged => {
                let chain_id: u64 = event.value.parse().map_err(|e| {
                    PortError::Validation(format!("chainChanged payload: {e}"))
                })?;
                if self.chain_id != Some(chain_id) {
                    self.chain_id = Some(chain_id);
                    self.balance = None;
                }
                Ok(None)
            }
            ProviderEventKind::Disconnected => {
                if self.status == ConnectionStatus::Disconnected {
                    Ok(None)
                } else {
                    self.apply(ConnectionAction::Disconnect).map(Some)
                }
            }
        }
    }
}
