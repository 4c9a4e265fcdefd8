//! Integration test: verifier accreditation, signed registration, expiry,
//! revocation and erasure across the directory and the ledger.

use chrono::Duration;

use trustreg_core::{Address, Clock, RegistryEvent, UseCase, VerificationProfile};
use trustreg_crypto::AttestationSigner;
use trustreg_integration_tests::{test_config, Deployment};
use trustreg_registry::{RegistryError, VerificationResult, VerifierInfo};

fn kyc() -> UseCase {
    UseCase::new("kyc")
}

fn v1() -> Address {
    Address::repeat_byte(0x01)
}

fn s1() -> Address {
    Address::repeat_byte(0x51)
}

// =========================================================================
// Attribution
// =========================================================================

#[test]
fn test_record_attributed_to_bound_identity() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    let k2 = AttestationSigner::generate();
    d.accredit(v1(), "Monokee", &k1);
    d.accredit(Address::repeat_byte(0x02), "Centre", &k2);

    let uuid = d.register(&k1, s1(), "kyc", 1_000).unwrap();
    let record = d.ledger.get_verification(uuid, &kyc()).unwrap();
    assert_eq!(record.verifier, v1());

    let by_v1 = d.ledger.get_verifications_for_verifier(&v1(), &kyc());
    assert_eq!(by_v1.len(), 1);
    assert!(d
        .ledger
        .get_verifications_for_verifier(&Address::repeat_byte(0x02), &kyc())
        .is_empty());
}

#[test]
fn test_rotated_key_takes_over() {
    let d = Deployment::new(test_config());
    let old_key = AttestationSigner::generate();
    let new_key = AttestationSigner::generate();
    d.accredit(v1(), "Monokee", &old_key);

    d.directory
        .update_verifier(
            d.admin(),
            v1(),
            VerifierInfo::new("Monokee", "did:web:monokee", "https://monokee.example", new_key.address()),
        )
        .unwrap();

    assert!(matches!(
        d.register(&old_key, s1(), "kyc", 1_000),
        Err(RegistryError::UnknownSigner(_))
    ));
    let uuid = d.register(&new_key, s1(), "kyc", 1_000).unwrap();
    assert_eq!(d.ledger.get_verification(uuid, &kyc()).unwrap().verifier, v1());
}

#[test]
fn test_signature_from_other_deployment_not_accepted() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "Monokee", &k1);

    let mut other_config = test_config();
    other_config.domain.chain_id = 1;
    let other = Deployment::new(other_config);
    let (result, signature) = other.attest(&k1, s1(), "kyc", 1_000);

    assert!(d
        .ledger
        .register_verification(s1(), &result, &signature)
        .is_err());
    assert_eq!(d.ledger.get_verification_count(), 0);
}

// =========================================================================
// Time
// =========================================================================

#[test]
fn test_expiry_without_mutation() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "Monokee", &k1);
    d.register(&k1, s1(), "kyc", 1_000).unwrap();

    d.clock.advance(Duration::seconds(999));
    assert!(d.ledger.is_verified(&s1(), &kyc()));

    let events = d.events.len();
    d.clock.advance(Duration::seconds(1));
    assert!(!d.ledger.is_verified(&s1(), &kyc()));
    assert_eq!(d.events.len(), events);
}

// =========================================================================
// Revocation and erasure
// =========================================================================

#[test]
fn test_revocation_is_monotonic() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "Monokee", &k1);
    let uuid = d.register(&k1, s1(), "kyc", 1_000).unwrap();

    d.ledger.revoke_verification(d.admin(), uuid, &kyc()).unwrap();
    d.ledger.revoke_verification(v1(), uuid, &kyc()).unwrap();
    assert!(!d.ledger.is_verified(&s1(), &kyc()));
    assert!(matches!(
        d.ledger.check_verification(uuid, &kyc()),
        Err(RegistryError::Revoked { .. })
    ));

    let revocations = d
        .events
        .events()
        .into_iter()
        .filter(|e| matches!(e, RegistryEvent::VerificationRevoked { .. }))
        .count();
    assert_eq!(revocations, 1);
}

#[test]
fn test_erasure_then_fresh_registration() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "Monokee", &k1);
    let first = d.register(&k1, s1(), "kyc", 1_000).unwrap();

    d.ledger.remove_verification(s1(), first, &kyc()).unwrap();
    assert!(matches!(
        d.ledger.get_verification(first, &kyc()),
        Err(RegistryError::Removed { .. })
    ));
    assert!(!d.ledger.is_verified(&s1(), &kyc()));

    let second = d.register(&k1, s1(), "kyc", 1_000).unwrap();
    assert!(second > first);
    assert!(d.ledger.is_verified(&s1(), &kyc()));
    assert_eq!(d.ledger.get_verification_count(), 2);
}

#[test]
fn test_removed_verifier_records_remain_until_expiry() {
    let d = Deployment::new(test_config());
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "Monokee", &k1);
    let uuid = d.register(&k1, s1(), "kyc", 1_000).unwrap();

    d.directory.remove_verifier(d.admin(), v1()).unwrap();
    assert!(d.ledger.is_verified(&s1(), &kyc()));
    d.ledger.revoke_verification(d.admin(), uuid, &kyc()).unwrap();
    assert!(!d.ledger.is_verified(&s1(), &kyc()));
}

// =========================================================================
// Schema profile
// =========================================================================

#[test]
fn test_schema_profile_deployment() {
    let mut config = test_config();
    config.verification.profile = VerificationProfile::Schema;
    let d = Deployment::new(config);
    let k1 = AttestationSigner::generate();
    d.accredit(v1(), "Monokee", &k1);

    let result = VerificationResult::schema(s1(), "kyc", d.clock.now() + Duration::seconds(60));
    let signature = d.sign(&k1, &result);
    d.ledger
        .register_verification(s1(), &result, &signature)
        .unwrap();
    assert!(d.ledger.is_verified(&s1(), &kyc()));

    let attestation = VerificationResult::attestation(
        s1(),
        "kyc",
        d.clock.now() + Duration::seconds(60),
        "sig",
        "{}",
    );
    let signature = vec![0u8; 65];
    assert!(matches!(
        d.ledger.register_verification(s1(), &attestation, &signature),
        Err(RegistryError::InvalidPayload(_))
    ));
}
