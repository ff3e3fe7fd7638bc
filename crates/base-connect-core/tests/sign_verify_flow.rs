use alloy::primitives::{Address, Bytes};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use base_connect_core::flow::{ALERT_EMPTY_MESSAGE, ALERT_SIGN_FAILED, ALERT_SWITCH_FAILED};
use base_connect_core::{verify_message, PortError, SignFlow, VerifyError};

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn signer() -> PrivateKeySigner {
    DEV_KEY.parse().expect("valid dev key")
}

fn sign(signer: &PrivateKeySigner, message: &str) -> Bytes {
    let signature = signer
        .sign_message_sync(message.as_bytes())
        .expect("sign message");
    Bytes::from(signature.as_bytes().to_vec())
}

#[test]
fn signature_verifies_for_the_signing_address() {
    let signer = signer();
    let signature = sign(&signer, "gm base");
    assert!(verify_message(signer.address(), "gm base", &signature).expect("verify"));
}

#[test]
fn signature_does_not_verify_for_another_address() {
    let signer = signer();
    let signature = sign(&signer, "gm base");
    let other: Address = "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("other address");
    assert!(!verify_message(other, "gm base", &signature).expect("verify"));
}

#[test]
fn altered_message_does_not_verify() {
    let signer = signer();
    let signature = sign(&signer, "gm base");
    assert!(!verify_message(signer.address(), "gm base!", &signature).expect("verify"));
}

#[test]
fn blank_message_raises_alert_without_touching_state() {
    let mut flow = SignFlow::with_message("   \n\t");
    flow.signature = Some(Bytes::from(vec![1u8; 65]));
    assert!(!flow.can_sign());
    assert!(flow.begin_sign().is_none());
    assert_eq!(flow.alert(), Some(ALERT_EMPTY_MESSAGE));
    assert!(!flow.is_signing);
    assert!(flow.signature.is_some());
}

#[test]
fn begin_sign_clears_previous_result() {
    let mut flow = SignFlow::with_message("hello");
    flow.signature = Some(Bytes::from(vec![1u8; 65]));
    flow.verified = Some(true);

    let message = flow.begin_sign().expect("message to sign");
    assert_eq!(message, "hello");
    assert!(flow.is_signing);
    assert!(!flow.can_sign());
    assert!(flow.signature.is_none());
    assert!(flow.verified.is_none());
}

#[test]
fn signed_message_is_pinned_when_input_changes() {
    let signer = signer();
    let mut flow = SignFlow::with_message("first");
    let message = flow.begin_sign().expect("message to sign");
    let signature = sign(&signer, &message);
    flow.finish_sign(message, Ok(signature));
    assert!(!flow.is_signing);
    assert_eq!(flow.signed_message, "first");

    flow.message = "edited after signing".to_owned();
    let request = flow
        .begin_verify(Some(signer.address()))
        .expect("verify request");
    assert_eq!(request.message, "first");
    assert!(flow.is_verifying);

    flow.finish_verify(request.run());
    assert_eq!(flow.verified, Some(true));
    assert!(!flow.is_verifying);
}

#[test]
fn sign_failure_alerts_and_resets_flag() {
    let mut flow = SignFlow::with_message("hello");
    let message = flow.begin_sign().expect("message");
    flow.finish_sign(
        message,
        Err(PortError::Rejected {
            code: 4001,
            message: "User rejected the request.".to_owned(),
        }),
    );
    assert!(!flow.is_signing);
    assert!(flow.signature.is_none());
    assert!(flow.signed_message.is_empty());
    assert_eq!(flow.take_alert().as_deref(), Some(ALERT_SIGN_FAILED));
    assert!(flow.alert().is_none());
}

#[test]
fn verify_is_a_noop_without_inputs() {
    let mut flow = SignFlow::with_message("hello");
    assert!(flow.begin_verify(Some(Address::ZERO)).is_none());

    flow.signature = Some(Bytes::from(vec![1u8; 65]));
    flow.signed_message = "hello".to_owned();
    assert!(flow.begin_verify(None).is_none());
    assert!(!flow.is_verifying);
}

#[test]
fn verify_error_marks_signature_unverified() {
    let mut flow = SignFlow::with_message("hello");
    flow.signature = Some(Bytes::from(vec![0u8; 10]));
    flow.signed_message = "hello".to_owned();
    let request = flow.begin_verify(Some(Address::ZERO)).expect("request");
    let result = request.run();
    assert!(matches!(result, Err(VerifyError::Encoding(_))));
    flow.finish_verify(result);
    assert_eq!(flow.verified, Some(false));
    assert!(!flow.is_verifying);
}

#[test]
fn contract_wallet_signature_is_kept_but_not_verified() {
    let signer = signer();
    let mut flow = SignFlow::with_message("gm base");
    let message = flow.begin_sign().expect("message");
    // ERC-6492 wrapped signature from a smart wallet
    let wrapped = Bytes::from(vec![0x22u8; 232]);
    flow.finish_sign(message, Ok(wrapped.clone()));
    assert!(flow.alert().is_none());
    assert!(!flow.is_signing);
    assert_eq!(flow.signature, Some(wrapped));
    assert_eq!(flow.signed_message, "gm base");

    let request = flow
        .begin_verify(Some(signer.address()))
        .expect("verify request");
    let result = request.run();
    assert!(matches!(result, Err(VerifyError::Encoding(_))));
    flow.finish_verify(result);
    assert_eq!(flow.verified, Some(false));
    assert!(flow.alert().is_none());
}

#[test]
fn switch_failure_raises_switch_alert() {
    let mut flow = SignFlow::with_message("hello");
    flow.alert_switch_failed(&PortError::Rejected {
        code: 4001,
        message: "User rejected the request.".to_owned(),
    });
    assert_eq!(flow.alert(), Some(ALERT_SWITCH_FAILED));
    assert_eq!(flow.take_alert().as_deref(), Some(ALERT_SWITCH_FAILED));
    assert!(flow.alert().is_none());
    assert_eq!(flow.message, "hello");
}

#[test]
fn reset_signature_clears_result_and_keeps_draft() {
    let signer = signer();
    let mut flow = SignFlow::with_message("gm base");
    let message = flow.begin_sign().expect("message");
    let signature = sign(&signer, &message);
    flow.finish_sign(message, Ok(signature));
    let request = flow
        .begin_verify(Some(signer.address()))
        .expect("verify request");
    flow.finish_verify(request.run());
    assert_eq!(flow.verified, Some(true));

    flow.is_signing = true;
    flow.is_verifying = true;
    flow.reset_signature();
    assert!(flow.signature.is_none());
    assert!(flow.signed_message.is_empty());
    assert!(flow.verified.is_none());
    assert!(!flow.is_signing);
    assert!(!flow.is_verifying);
    assert_eq!(flow.message, "gm base");
    assert!(flow.begin_verify(Some(signer.address())).is_none());
}
