//! Application state types
//!
//! Session and sign/verify state live in base-connect-core. This module only
//! holds what the shell keeps across restarts and a few display helpers.

use serde::{Deserialize, Serialize};

use base_connect_core::{AccountSnapshot, Balance};

/// Persisted through eframe storage under [`eframe::APP_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    /// Present when the wallet was connected at shutdown; triggers a silent
    /// reconnect on the next start.
    pub last_account: Option<AccountSnapshot>,
    pub message_draft: String,
}

impl PersistedState {
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        storage
            .and_then(|s| eframe::get_value(s, eframe::APP_KEY))
            .unwrap_or_default()
    }

    pub fn store(&self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }
}

pub fn balance_label(balance: Option<&Balance>) -> String {
    balance
        .map(Balance::display)
        .unwrap_or_else(|| "Loading...".to_owned())
}

/// `0x1234…abcd` form used in the header.
pub fn short_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_owned();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use base_connect_core::BASE;

    #[test]
    fn missing_balance_reads_loading() {
        assert_eq!(balance_label(None), "Loading...");
        let balance = Balance::native(&BASE, U256::from(1_000_000_000_000_000u64));
        assert_eq!(balance_label(Some(&balance)), "0.0010 ETH");
    }

    #[test]
    fn short_address_keeps_prefix_and_suffix() {
        assert_eq!(
            short_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            "0xf39F…2266"
        );
        assert_eq!(short_address("0x1234"), "0x1234");
    }
}
