pub mod controller;
pub mod domain;
pub mod flow;
pub mod ports;
pub mod session;
pub mod state_machine;
pub mod verify;

pub use controller::{CommandResult, WalletCommand, WalletController};
pub use domain::{
    chain_by_id, chain_display_name, is_supported_chain, AccountSnapshot, AppMetadata, Balance,
    ChainInfo, ProviderEvent, ProviderEventKind, BASE, BASE_SEPOLIA, DEFAULT_CHAIN,
    SUPPORTED_CHAINS,
};
pub use flow::{SignFlow, VerifyRequest};
pub use ports::{PortError, ProviderPort, UNRECOGNIZED_CHAIN, USER_REJECTED_REQUEST};
pub use session::WalletSession;
pub use state_machine::{
    connection_transition, ConnectionAction, ConnectionStatus, StateTransition,
};
pub use verify::{recover_signer, verify_message, VerifyError};
