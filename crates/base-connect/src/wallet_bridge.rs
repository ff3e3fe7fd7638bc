//! Bridge between the egui shell and the wallet workspace crates.
//! This must remain the only shell-facing boundary for wallet operations.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};

use base_connect_adapters::{AdapterConfig, BalanceAdapter, Eip1193Adapter};
use base_connect_core::{
    chain_by_id, Balance, CommandResult, PortError, ProviderPort, WalletCommand,
    WalletController, WalletSession,
};

type Controller = WalletController<Eip1193Adapter>;

#[derive(Clone)]
pub struct WalletBridge {
    controller: Arc<Controller>,
    balances: BalanceAdapter,
}

impl WalletBridge {
    pub fn new(config: &AdapterConfig) -> Result<Self, PortError> {
        let provider = Eip1193Adapter::with_config(config);
        tracing::info!(mode = provider.mode_label(), "wallet provider ready");
        Ok(Self {
            controller: Arc::new(WalletController::new(provider)),
            balances: BalanceAdapter::with_config(config)?,
        })
    }

    pub fn provider_label(&self) -> &'static str {
        self.controller.provider.mode_label()
    }

    pub fn session(&self) -> Result<WalletSession, PortError> {
        self.controller.session()
    }

    pub fn connect(&self) -> Result<CommandResult, PortError> {
        self.discard_stale_events();
        self.controller.handle(WalletCommand::Connect)
    }

    pub fn reconnect(&self) -> Result<CommandResult, PortError> {
        self.discard_stale_events();
        self.controller.handle(WalletCommand::Reconnect)
    }

    pub fn disconnect(&self) -> Result<CommandResult, PortError> {
        self.controller.handle(WalletCommand::Disconnect)
    }

    pub fn switch_chain(&self, chain_id: u64) -> Result<CommandResult, PortError> {
        self.controller
            .handle(WalletCommand::SwitchChain { chain_id })
    }

    pub fn sign_message(&self, message: String) -> Result<Bytes, PortError> {
        self.controller
            .handle(WalletCommand::SignMessage { message })?
            .signature
            .ok_or_else(|| PortError::Transport("wallet returned no signature".to_owned()))
    }

    pub fn recover_provider_events(&self) -> Result<CommandResult, PortError> {
        self.controller.handle(WalletCommand::RecoverProviderEvents)
    }

    pub async fn fetch_balance(
        &self,
        address: Address,
        chain_id: u64,
    ) -> Result<Balance, PortError> {
        let chain = chain_by_id(chain_id)
            .ok_or_else(|| PortError::Validation(format!("unsupported chain: {chain_id}")))?;
        self.balances.fetch_balance(chain, address).await
    }

    pub fn record_balance(
        &self,
        address: Address,
        chain_id: u64,
        balance: Balance,
    ) -> Result<bool, PortError> {
        self.controller.record_balance(address, chain_id, balance)
    }

    // Events queued while no session was live describe a wallet state the
    // next connect reads fresh anyway.
    fn discard_stale_events(&self) {
        match self.controller.provider.drain_events() {
            Ok(stale) if !stale.is_empty() => {
                tracing::debug!(count = stale.len(), "dropped stale provider events");
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("provider events unavailable: {e}"),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn connect_async(&self) -> Result<CommandResult, PortError> {
        let provider = &self.controller.provider;
        if provider.is_browser() {
            self.discard_stale_events();
            provider.wasm_request_accounts_async().await?;
            provider.wasm_chain_id_async().await?;
            self.register_hooks();
        }
        self.connect()
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn reconnect_async(&self) -> Result<CommandResult, PortError> {
        let provider = &self.controller.provider;
        if provider.is_browser() {
            self.discard_stale_events();
            let accounts = provider.wasm_accounts_async().await?;
            if accounts.is_empty() {
                return Ok(CommandResult::default());
            }
            provider.wasm_chain_id_async().await?;
            self.register_hooks();
        }
        self.reconnect()
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn switch_chain_async(&self, chain_id: u64) -> Result<CommandResult, PortError> {
        let provider = &self.controller.provider;
        if !provider.is_browser() {
            return self.switch_chain(chain_id);
        }
        let chain = chain_by_id(chain_id)
            .ok_or_else(|| PortError::Validation(format!("unsupported chain: {chain_id}")))?;
        if !self.session()?.is_connected() {
            return Err(PortError::Policy("NO_CONNECTED_ACCOUNT".to_owned()));
        }
        provider.wasm_switch_chain_async(chain).await?;
        // The adapter queued a chainChanged event; folding it in updates the session.
        self.recover_provider_events()
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn sign_message_async(&self, message: String) -> Result<Bytes, PortError> {
        let provider = &self.controller.provider;
        if !provider.is_browser() {
            return self.sign_message(message);
        }
        let session = self.session()?;
        let signer = session
            .address
            .filter(|_| session.is_connected())
            .ok_or_else(|| PortError::Policy("NO_CONNECTED_ACCOUNT".to_owned()))?;
        provider.wasm_personal_sign_async(&message, signer).await
    }

    #[cfg(target_arch = "wasm32")]
    fn register_hooks(&self) {
        if let Err(e) = self.controller.provider.register_browser_hooks() {
            tracing::warn!("wallet event listeners unavailable: {e}");
        }
    }
}
