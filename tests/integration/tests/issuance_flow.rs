//! Integration test: verification-gated issuance and two-party consumption
//! on top of a live ledger.

use trustreg_core::{Address, CredentialId, CredentialState, RegistryEvent, UseCase};
use trustreg_crypto::AttestationSigner;
use trustreg_integration_tests::{test_config, Deployment};
use trustreg_issuance::{CredentialTokens, DiplomaMetadata, InMemoryContentStore, IssuanceError};

fn kyc() -> UseCase {
    UseCase::new("kyc")
}

fn v1() -> Address {
    Address::repeat_byte(0x01)
}

fn s1() -> Address {
    Address::repeat_byte(0x51)
}

#[test]
fn test_revoked_subject_cannot_request() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "V1", &k1);

    let uuid = d.register(&k1, s1(), "kyc", 1_000).unwrap();
    assert!(d.ledger.is_verified(&s1(), &kyc()));

    d.ledger.revoke_verification(d.admin(), uuid, &kyc()).unwrap();
    assert!(!d.ledger.is_verified(&s1(), &kyc()));

    let err = d
        .workflow
        .accept_new_diploma_request(s1(), "uri0")
        .unwrap_err();
    assert!(matches!(err, IssuanceError::NotVerified { .. }));
}

#[test]
fn test_reverified_subject_full_cycle() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "V1", &k1);
    let first = d.register(&k1, s1(), "kyc", 1_000).unwrap();
    d.ledger.revoke_verification(d.admin(), first, &kyc()).unwrap();

    d.register(&k1, s1(), "kyc", 1_000).unwrap();
    let id = d.workflow.accept_new_diploma_request(s1(), "uri1").unwrap();
    assert_eq!(id, CredentialId(1));
    assert_eq!(d.workflow.credential(id).unwrap().state, CredentialState::Issued);

    d.tokens.approve(s1(), d.workflow.operator(), id).unwrap();
    d.workflow.consume_diploma_access_token(d.admin(), id).unwrap();
    assert_eq!(d.workflow.credential(id).unwrap().state, CredentialState::Consumed);
    assert_eq!(
        d.events.last(),
        Some(RegistryEvent::CredentialConsumed {
            id,
            holder: s1(),
            operator: d.workflow.operator()
        })
    );

    assert!(matches!(
        d.workflow.consume_diploma_access_token(d.admin(), id),
        Err(IssuanceError::AlreadyConsumed(_))
    ));
}

#[test]
fn test_consume_before_approval_fails() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "V1", &k1);
    d.register(&k1, s1(), "kyc", 1_000).unwrap();
    let id = d.workflow.accept_new_diploma_request(s1(), "uri").unwrap();

    assert!(matches!(
        d.workflow.consume_diploma_access_token(d.admin(), id),
        Err(IssuanceError::NotApproved(_))
    ));
    assert!(matches!(
        d.workflow.consume_diploma_access_token(s1(), id),
        Err(IssuanceError::Unauthorized { .. })
    ));
    assert_eq!(d.tokens.owner_of(id).unwrap(), s1());
}

#[test]
fn test_consumed_ids_never_reissued() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "V1", &k1);
    d.register(&k1, s1(), "kyc", 1_000).unwrap();

    let first = d.workflow.accept_new_diploma_request(s1(), "a").unwrap();
    d.tokens.approve(s1(), d.workflow.operator(), first).unwrap();
    d.workflow.consume_diploma_access_token(d.admin(), first).unwrap();

    let second = d.workflow.accept_new_diploma_request(s1(), "b").unwrap();
    assert_ne!(first, second);
    assert_eq!(d.workflow.credentials_of(&s1()).len(), 2);
}

#[tokio::test]
async fn test_metadata_request_after_verification() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "V1", &k1);
    d.register(&k1, s1(), "kyc", 1_000).unwrap();

    let store = InMemoryContentStore::new();
    let metadata = DiplomaMetadata {
        name: "Diploma".into(),
        description: "Diploma access token".into(),
        image: "https://example.org/diploma.png".into(),
        details: serde_json::json!({ "course": "Computer Engineering" }),
    };
    let id = d
        .workflow
        .request_with_metadata(s1(), &metadata, &store)
        .await
        .unwrap();

    let uri = d.tokens.token_uri(id).unwrap();
    assert_eq!(d.workflow.credential(id).unwrap().metadata_uri, uri);
    assert!(store.get(&uri).is_some());
}
