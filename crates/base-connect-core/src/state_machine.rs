use serde::{Deserialize, Serialize};

use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionAction {
    Request,
    Established,
    Failed,
    AccountsEmptied,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ConnectionStatus,
    pub to: ConnectionStatus,
    pub reason: &'static str,
}

pub fn connection_transition(
    from: ConnectionStatus,
    action: ConnectionAction,
) -> Result<(ConnectionStatus, StateTransition), PortError> {
    use ConnectionAction as A;
    use ConnectionStatus as S;

    let (to, reason) = match (from, action) {
        (S::Disconnected, A::Request) => (S::Connecting, "connect_requested"),
        // A silent reconnect goes straight to connected.
        (S::Disconnected, A::Established) => (S::Connected, "session_restored"),
        (S::Connecting, A::Established) => (S::Connected, "wallet_connected"),
        (S::Connecting, A::Failed) => (S::Disconnected, "connect_failed"),
        (S::Connected, A::Established) => (S::Connected, "account_switched"),
        (S::Connected, A::AccountsEmptied) => (S::Disconnected, "wallet_locked"),
        (S::Connecting | S::Connected, A::Disconnect) => (S::Disconnected, "disconnected"),
        _ => {
            return Err(PortError::Validation(format!(
                "illegal connection transition: {from:?} + {action:?}"
            )))
        }
    };

    Ok((to, StateTransition { from, to, reason }))
}
