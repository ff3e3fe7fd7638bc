use base_connect_core::{connection_transition, ConnectionAction, ConnectionStatus};

#[test]
fn connect_happy_path_transitions() {
    let (s1, t1) = connection_transition(ConnectionStatus::Disconnected, ConnectionAction::Request)
        .expect("disconnected -> connecting");
    assert_eq!(s1, ConnectionStatus::Connecting);
    assert_eq!(t1.reason, "connect_requested");
    let (s2, _) =
        connection_transition(s1, ConnectionAction::Established).expect("connecting -> connected");
    assert_eq!(s2, ConnectionStatus::Connected);
    let (s3, _) =
        connection_transition(s2, ConnectionAction::Disconnect).expect("connected -> disconnected");
    assert_eq!(s3, ConnectionStatus::Disconnected);
}

#[test]
fn failed_connect_returns_to_disconnected() {
    let (s, t) = connection_transition(ConnectionStatus::Connecting, ConnectionAction::Failed)
        .expect("connecting -> disconnected");
    assert_eq!(s, ConnectionStatus::Disconnected);
    assert_eq!(t.reason, "connect_failed");
}

#[test]
fn restored_session_skips_connecting() {
    let (s, t) =
        connection_transition(ConnectionStatus::Disconnected, ConnectionAction::Established)
            .expect("restore");
    assert_eq!(s, ConnectionStatus::Connected);
    assert_eq!(t.reason, "session_restored");
}

#[test]
fn locked_wallet_disconnects() {
    let (s, _) = connection_transition(ConnectionStatus::Connected, ConnectionAction::AccountsEmptied)
        .expect("connected -> disconnected");
    assert_eq!(s, ConnectionStatus::Disconnected);
}

#[test]
fn illegal_transitions_are_rejected() {
    let err = connection_transition(ConnectionStatus::Disconnected, ConnectionAction::Disconnect)
        .expect_err("must fail");
    assert!(err.to_string().contains("illegal connection transition"));

    let err = connection_transition(ConnectionStatus::Connected, ConnectionAction::Request)
        .expect_err("must fail");
    assert!(err.to_string().contains("illegal connection transition"));
}
