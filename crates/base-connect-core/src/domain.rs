use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// An EVM network the app knows how to talk about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainInfo {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
}

/// Base mainnet (chain ID 8453).
pub const BASE: ChainInfo = ChainInfo {
    chain_id: 8453,
    name: "Base",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://mainnet.base.org",
    explorer_url: "https://basescan.org",
    is_testnet: false,
};

/// Base Sepolia testnet (chain ID 84532).
pub const BASE_SEPOLIA: ChainInfo = ChainInfo {
    chain_id: 84532,
    name: "Base Sepolia",
    symbol: "ETH",
    decimals: 18,
    rpc_url: "https://sepolia.base.org",
    explorer_url: "https://sepolia.basescan.org",
    is_testnet: true,
};

pub const SUPPORTED_CHAINS: &[ChainInfo] = &[BASE, BASE_SEPOLIA];

/// Network the switch button targets.
pub const DEFAULT_CHAIN: ChainInfo = BASE;

// Names for chains a wallet is commonly sitting on when it shows up on the
// wrong network. Display only.
const WELL_KNOWN_CHAINS: &[(u64, &str)] = &[
    (1, "Ethereum"),
    (10, "OP Mainnet"),
    (137, "Polygon"),
    (42161, "Arbitrum One"),
    (11155111, "Sepolia"),
];

pub fn is_supported_chain(chain_id: u64) -> bool {
    SUPPORTED_CHAINS.iter().any(|c| c.chain_id == chain_id)
}

pub fn chain_by_id(chain_id: u64) -> Option<&'static ChainInfo> {
    SUPPORTED_CHAINS.iter().find(|c| c.chain_id == chain_id)
}

pub fn chain_display_name(chain_id: u64) -> String {
    if let Some(chain) = chain_by_id(chain_id) {
        return chain.name.to_owned();
    }
    WELL_KNOWN_CHAINS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| (*name).to_owned())
        .unwrap_or_else(|| format!("Chain {chain_id}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    pub chain_id: u64,
}

/// Native balance of the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub value: U256,
    pub decimals: u8,
    pub symbol: String,
}

impl Balance {
    pub fn native(chain: &ChainInfo, value: U256) -> Self {
        Self {
            value,
            decimals: chain.decimals,
            symbol: chain.symbol.to_owned(),
        }
    }

    /// Full-precision decimal string, e.g. `"1.500000000000000000"`.
    pub fn formatted(&self) -> String {
        format_units(self.value, self.decimals).unwrap_or_else(|_| self.value.to_string())
    }

    /// Rounded to four places with the symbol appended: `"1.5000 ETH"`.
    pub fn display(&self) -> String {
        let rounded = self
            .formatted()
            .parse::<f64>()
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|_| self.formatted());
        format!("{} {}", rounded, self.symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub sequence: u64,
    pub kind: ProviderEventKind,
    /// JSON array of addresses for `AccountsChanged`, decimal chain id for
    /// `ChainChanged`, empty for `Disconnected`.
    pub value: String,
}

/// Dapp metadata handed to wallets that display who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<String>,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "Base Wallet Connect".to_owned(),
            description: "Connect your wallet to Base network and sign messages securely".to_owned(),
            url: "https://base-appkit-demo.vercel.app".to_owned(),
            icons: vec!["https://avatars.githubusercontent.com/u/179229932".to_owned()],
        }
    }
}
