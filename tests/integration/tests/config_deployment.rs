//! Integration test: a deployment driven by a TOML configuration file, and
//! the trusted contract allow-list next to it.

use std::io::Write;

use trustreg_core::{Address, RegistryConfig, UseCase, VerificationProfile};
use trustreg_crypto::AttestationSigner;
use trustreg_integration_tests::Deployment;
use trustreg_issuance::IssuanceError;
use trustreg_registry::RegistryError;

const CONFIG: &str = r#"
administrator = "0xadadadadadadadadadadadadadadadadadadadad"

[domain]
name = "VerificationRegistry"
version = "1.0"
chain_id = 1337
verifying_contract = "0xcccccccccccccccccccccccccccccccccccccccc"

[verification]
profile = "attestation"

[issuance]
use_case = "diploma"
operator = "0x0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e"

[logging]
level = "debug"
"#;

fn load() -> RegistryConfig {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    RegistryConfig::load(file.path()).unwrap()
}

#[test]
fn test_config_file_drives_deployment() {
    let config = load();
    assert_eq!(config.administrator, Address::repeat_byte(0xad));
    assert_eq!(config.verification.profile, VerificationProfile::Attestation);

    let d = Deployment::new(config);
    assert_eq!(d.ledger.domain().chain_id, 1337);
    assert_eq!(d.workflow.use_case(), &UseCase::new("diploma"));
    assert_eq!(d.workflow.operator(), Address::repeat_byte(0x0e));

    let k1 = AttestationSigner::generate();
    let subject = Address::repeat_byte(0x51);
    d.accredit(Address::repeat_byte(0x01), "Monokee", &k1);

    d.register(&k1, subject, "kyc", 1_000).unwrap();
    assert!(matches!(
        d.workflow.accept_new_diploma_request(subject, "uri"),
        Err(IssuanceError::NotVerified { .. })
    ));

    d.register(&k1, subject, "diploma", 1_000).unwrap();
    assert!(d.workflow.accept_new_diploma_request(subject, "uri").is_ok());
}

#[test]
fn test_trusted_contracts_under_configured_admin() {
    let d = Deployment::new(load());
    let manager = Address::repeat_byte(0x77);

    assert!(matches!(
        d.trusted.is_trusted(&manager),
        Err(RegistryError::ContractNotFound(_))
    ));
    d.trusted
        .register(d.admin(), manager, "DiplomaIssuerManager", true)
        .unwrap();
    assert!(d.trusted.is_trusted(&manager).unwrap());

    d.trusted.edit_trust(d.admin(), manager, false).unwrap();
    assert!(!d.trusted.is_trusted(&manager).unwrap());
    assert_eq!(d.trusted.get_contract_count(), 1);
    assert_eq!(d.trusted.list_contracts()[0].name, "DiplomaIssuerManager");

    assert!(matches!(
        d.trusted.register(Address::repeat_byte(0x51), Address::repeat_byte(0x78), "x", true),
        Err(RegistryError::Unauthorized { .. })
    ));
}
