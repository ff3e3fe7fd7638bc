use std::sync::Mutex;

use alloy::primitives::{Address, Bytes};

use base_connect_core::{
    ChainInfo, ConnectionStatus, PortError, ProviderEvent, ProviderEventKind, ProviderPort,
    WalletCommand, WalletController,
};

#[derive(Debug, Default)]
struct FakeWallet {
    accounts: Mutex<Vec<Address>>,
    chain_id: Mutex<u64>,
    reject_connect: bool,
    reject_switch: bool,
    events: Mutex<Vec<ProviderEvent>>,
    switched_to: Mutex<Vec<u64>>,
}

impl FakeWallet {
    fn on_chain(chain_id: u64) -> Self {
        Self {
            accounts: Mutex::new(vec![account()]),
            chain_id: Mutex::new(chain_id),
            ..Self::default()
        }
    }
}

impl ProviderPort for FakeWallet {
    fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        if self.reject_connect {
            return Err(PortError::Rejected {
                code: 4001,
                message: "User rejected the request.".to_owned(),
            });
        }
        Ok(self.accounts.lock().expect("accounts").clone())
    }

    fn accounts(&self) -> Result<Vec<Address>, PortError> {
        Ok(self.accounts.lock().expect("accounts").clone())
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        Ok(*self.chain_id.lock().expect("chain"))
    }

    fn personal_sign(&self, message: &str, _signer: Address) -> Result<Bytes, PortError> {
        let mut sig = vec![0u8; 65];
        sig[0] = message.len() as u8;
        Ok(Bytes::from(sig))
    }

    fn switch_chain(&self, chain: &ChainInfo) -> Result<(), PortError> {
        if self.reject_switch {
            return Err(PortError::Rejected {
                code: 4001,
                message: "User rejected the request.".to_owned(),
            });
        }
        *self.chain_id.lock().expect("chain") = chain.chain_id;
        self.switched_to.lock().expect("switched").push(chain.chain_id);
        Ok(())
    }

    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        Ok(std::mem::take(&mut *self.events.lock().expect("events")))
    }
}

fn account() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("valid account")
}

#[test]
fn connect_establishes_session() {
    let controller = WalletController::new(FakeWallet::on_chain(8453));
    let result = controller.handle(WalletCommand::Connect).expect("connect");
    assert_eq!(
        result.transition.expect("transition").to,
        ConnectionStatus::Connected
    );

    let session = controller.session().expect("session");
    assert!(session.is_connected());
    assert_eq!(session.address, Some(account()));
    assert!(!session.wrong_network());
}

#[test]
fn rejected_connect_leaves_session_disconnected() {
    let wallet = FakeWallet {
        reject_connect: true,
        ..FakeWallet::on_chain(8453)
    };
    let controller = WalletController::new(wallet);
    let err = controller
        .handle(WalletCommand::Connect)
        .expect_err("must fail");
    assert!(err.is_user_rejection());
    assert_eq!(
        controller.session().expect("session").status,
        ConnectionStatus::Disconnected
    );
}

#[test]
fn reconnect_without_authorized_accounts_is_quiet() {
    let controller = WalletController::new(FakeWallet::default());
    let result = controller.handle(WalletCommand::Reconnect).expect("reconnect");
    assert!(result.transition.is_none());
    assert!(!controller.session().expect("session").is_connected());
}

#[test]
fn switch_chain_moves_wallet_to_base() {
    let controller = WalletController::new(FakeWallet::on_chain(1));
    controller.handle(WalletCommand::Connect).expect("connect");
    assert!(controller.session().expect("session").wrong_network());

    controller
        .handle(WalletCommand::SwitchChain { chain_id: 8453 })
        .expect("switch");
    let session = controller.session().expect("session");
    assert_eq!(session.chain_id, Some(8453));
    assert!(!session.wrong_network());
    assert_eq!(
        *controller.provider.switched_to.lock().expect("switched"),
        vec![8453]
    );
}

#[test]
fn rejected_switch_keeps_wrong_network() {
    let wallet = FakeWallet {
        reject_switch: true,
        ..FakeWallet::on_chain(1)
    };
    let controller = WalletController::new(wallet);
    controller.handle(WalletCommand::Connect).expect("connect");

    let err = controller
        .handle(WalletCommand::SwitchChain { chain_id: 8453 })
        .expect_err("must fail");
    assert!(err.is_user_rejection());

    let session = controller.session().expect("session");
    assert!(session.is_connected());
    assert_eq!(session.chain_id, Some(1));
    assert!(session.wrong_network());
    assert!(controller
        .provider
        .switched_to
        .lock()
        .expect("switched")
        .is_empty());
}

#[test]
fn switch_to_unsupported_chain_is_rejected() {
    let controller = WalletController::new(FakeWallet::on_chain(8453));
    controller.handle(WalletCommand::Connect).expect("connect");
    let err = controller
        .handle(WalletCommand::SwitchChain { chain_id: 1 })
        .expect_err("must fail");
    assert!(err.to_string().contains("unsupported chain"));
}

#[test]
fn sign_requires_connected_account() {
    let controller = WalletController::new(FakeWallet::on_chain(8453));
    let err = controller
        .handle(WalletCommand::SignMessage {
            message: "hello".to_owned(),
        })
        .expect_err("must fail");
    assert!(err.to_string().contains("NO_CONNECTED_ACCOUNT"));

    controller.handle(WalletCommand::Connect).expect("connect");
    let result = controller
        .handle(WalletCommand::SignMessage {
            message: "hello".to_owned(),
        })
        .expect("sign");
    let signature = result.signature.expect("signature");
    assert_eq!(signature.len(), 65);
    assert_eq!(signature[0], 5);
}

#[test]
fn provider_events_update_session() {
    let controller = WalletController::new(FakeWallet::on_chain(8453));
    controller.handle(WalletCommand::Connect).expect("connect");

    controller
        .provider
        .events
        .lock()
        .expect("events")
        .extend([
            ProviderEvent {
                sequence: 1,
                kind: ProviderEventKind::ChainChanged,
                value: "10".to_owned(),
            },
            ProviderEvent {
                sequence: 2,
                kind: ProviderEventKind::AccountsChanged,
                value: "[]".to_owned(),
            },
        ]);

    let result = controller
        .handle(WalletCommand::RecoverProviderEvents)
        .expect("recover");
    assert_eq!(result.events.len(), 2);
    assert_eq!(
        result.transition.expect("transition").to,
        ConnectionStatus::Disconnected
    );
    assert!(!controller.session().expect("session").is_connected());
}

#[test]
fn malformed_provider_event_does_not_drop_the_batch() {
    let controller = WalletController::new(FakeWallet::on_chain(1));
    controller.handle(WalletCommand::Connect).expect("connect");

    controller
        .provider
        .events
        .lock()
        .expect("events")
        .extend([
            ProviderEvent {
                sequence: 1,
                kind: ProviderEventKind::ChainChanged,
                value: "not-a-number".to_owned(),
            },
            ProviderEvent {
                sequence: 2,
                kind: ProviderEventKind::ChainChanged,
                value: "8453".to_owned(),
            },
        ]);

    let result = controller
        .handle(WalletCommand::RecoverProviderEvents)
        .expect("recover");
    assert_eq!(result.events.len(), 2);

    let session = controller.session().expect("session");
    assert!(session.is_connected());
    assert_eq!(session.chain_id, Some(8453));
    assert!(!session.wrong_network());
}
