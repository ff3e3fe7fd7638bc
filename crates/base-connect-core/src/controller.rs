use std::sync::Mutex;

use alloy::primitives::{Address, Bytes};

use crate::domain::{chain_by_id, ProviderEvent};
use crate::ports::{PortError, ProviderPort};
use crate::session::WalletSession;
use crate::state_machine::{ConnectionAction, StateTransition};

#[derive(Debug, Clone)]
pub enum WalletCommand {
    Connect,
    /// Restore an earlier session without prompting the wallet.
    Reconnect,
    Disconnect,
    SwitchChain { chain_id: u64 },
    SignMessage { message: String },
    RecoverProviderEvents,
}

#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    pub transition: Option<StateTransition>,
    pub signature: Option<Bytes>,
    pub events: Vec<ProviderEvent>,
}

impl CommandResult {
    fn empty() -> Self {
        Self::default()
    }

    fn with_transition(transition: StateTransition) -> Self {
        Self {
            transition: Some(transition),
            ..Self::default()
        }
    }
}

pub struct WalletController<P> {
    pub provider: P,
    session: Mutex<WalletSession>,
}

impl<P> WalletController<P>
where
    P: ProviderPort,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            session: Mutex::new(WalletSession::default()),
        }
    }

    pub fn session(&self) -> Result<WalletSession, PortError> {
        Ok(self.lock_session()?.clone())
    }

    pub fn handle(&self, command: WalletCommand) -> Result<CommandResult, PortError> {
        tracing::debug!(?command, "wallet command");
        match command {
            WalletCommand::Connect => self.connect(),
            WalletCommand::Reconnect => self.reconnect(),
            WalletCommand::Disconnect => self.disconnect(),
            WalletCommand::SwitchChain { chain_id } => self.switch_chain(chain_id),
            WalletCommand::SignMessage { message } => self.sign_message(message),
            WalletCommand::RecoverProviderEvents => self.recover_provider_events(),
        }
    }

    fn lock_session(&self) -> Result<std::sync::MutexGuard<'_, WalletSession>, PortError> {
        self.session
            .lock()
            .map_err(|e| PortError::Transport(format!("session lock poisoned: {e}")))
    }

    fn connect(&self) -> Result<CommandResult, PortError> {
        let requested = self.lock_session()?.apply(ConnectionAction::Request)?;
        log_transition(&requested);

        let outcome = self
            .provider
            .request_accounts()
            .and_then(|accounts| {
                let address = accounts.into_iter().next().ok_or_else(|| {
                    PortError::Policy("wallet returned no accounts".to_owned())
                })?;
                Ok((address, self.provider.chain_id()?))
            });

        let mut session = self.lock_session()?;
        match outcome {
            Ok((address, chain_id)) => {
                let transition = session.establish(address, chain_id)?;
                log_transition(&transition);
                tracing::info!(%address, chain_id, "wallet connected");
                Ok(CommandResult::with_transition(transition))
            }
            Err(e) => {
                let transition = session.apply(ConnectionAction::Failed)?;
                log_transition(&transition);
                Err(e)
            }
        }
    }

    fn reconnect(&self) -> Result<CommandResult, PortError> {
        let Some(address) = self.provider.accounts()?.into_iter().next() else {
            tracing::info!("no authorized accounts; staying disconnected");
            return Ok(CommandResult::empty());
        };
        let chain_id = self.provider.chain_id()?;
        let transition = self.lock_session()?.establish(address, chain_id)?;
        log_transition(&transition);
        Ok(CommandResult::with_transition(transition))
    }

    fn disconnect(&self) -> Result<CommandResult, PortError> {
        let transition = self.lock_session()?.apply(ConnectionAction::Disconnect)?;
        log_transition(&transition);
        Ok(CommandResult::with_transition(transition))
    }

    fn switch_chain(&self, chain_id: u64) -> Result<CommandResult, PortError> {
        let chain = chain_by_id(chain_id)
            .ok_or_else(|| PortError::Validation(format!("unsupported chain: {chain_id}")))?;
        if !self.lock_session()?.is_connected() {
            return Err(PortError::Policy("NO_CONNECTED_ACCOUNT".to_owned()));
        }
        self.provider.switch_chain(chain)?;
        let confirmed = self.provider.chain_id()?;
        let mut session = self.lock_session()?;
        if session.chain_id != Some(confirmed) {
            session.chain_id = Some(confirmed);
            session.balance = None;
        }
        tracing::info!(chain_id = confirmed, "switched chain");
        Ok(CommandResult::empty())
    }

    fn sign_message(&self, message: String) -> Result<CommandResult, PortError> {
        let signer = self.connected_address()?;
        let signature = self.provider.personal_sign(&message, signer)?;
        tracing::info!(%signer, bytes = signature.len(), "message signed");
        Ok(CommandResult {
            signature: Some(signature),
            ..CommandResult::empty()
        })
    }

    fn recover_provider_events(&self) -> Result<CommandResult, PortError> {
        let events = self.provider.drain_events()?;
        let mut session = self.lock_session()?;
        let mut last_transition = None;
        for event in &events {
            match session.apply_event(event) {
                Ok(Some(transition)) => {
                    log_transition(&transition);
                    last_transition = Some(transition);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        sequence = event.sequence,
                        kind = ?event.kind,
                        "skipping provider event: {e}"
                    );
                }
            }
        }
        Ok(CommandResult {
            transition: last_transition,
            signature: None,
            events,
        })
    }

    fn connected_address(&self) -> Result<Address, PortError> {
        let session = self.lock_session()?;
        if !session.is_connected() {
            return Err(PortError::Policy("NO_CONNECTED_ACCOUNT".to_owned()));
        }
        session
            .address
            .ok_or_else(|| PortError::Policy("NO_CONNECTED_ACCOUNT".to_owned()))
    }

    /// Stores a balance fetched outside the controller, as long as it still
    /// belongs to the current account and chain.
    pub fn record_balance(
        &self,
        address: Address,
        chain_id: u64,
        balance: crate::domain::Balance,
    ) -> Result<bool, PortError> {
        let mut session = self.lock_session()?;
        if session.address == Some(address) && session.chain_id == Some(chain_id) {
            session.balance = Some(balance);
            return Ok(true);
        }
        Ok(false)
    }
}

fn log_transition(transition: &StateTransition) {
    tracing::info!(
        from = ?transition.from,
        to = ?transition.to,
        reason = transition.reason,
        "connection transition"
    );
}
