//! A full in-process deployment wired from one [`RegistryConfig`], driven
//! by a manual clock and recording every event.

use std::sync::Arc;

use chrono::Duration;

use trustreg_core::{telemetry, Address, Clock, EventLog, ManualClock, RegistryConfig};
use trustreg_crypto::AttestationSigner;
use trustreg_issuance::{AccessTokenRegistry, IssuanceWorkflow};
use trustreg_registry::{
    RegistryError, TrustedContractRegistry, VerificationLedger, VerificationResult,
    VerifierDirectory, VerifierInfo,
};

/// Unix time every deployment starts at.
pub const GENESIS: i64 = 1_700_000_000;

pub struct Deployment {
    pub config: RegistryConfig,
    pub clock: Arc<ManualClock>,
    pub events: Arc<EventLog>,
    pub directory: Arc<VerifierDirectory>,
    pub ledger: Arc<VerificationLedger>,
    pub trusted: TrustedContractRegistry,
    pub tokens: Arc<AccessTokenRegistry>,
    pub workflow: IssuanceWorkflow,
}

impl Deployment {
    pub fn new(config: RegistryConfig) -> Self {
        telemetry::init_tracing(&config.logging);
        let clock = Arc::new(ManualClock::at_unix(GENESIS));
        let events = Arc::new(EventLog::new());
        let directory = Arc::new(VerifierDirectory::new(config.administrator, events.clone()));
        let ledger = Arc::new(
            VerificationLedger::from_config(Arc::clone(&directory), &config)
                .with_clock(clock.clone()),
        );
        let trusted = TrustedContractRegistry::new(config.administrator, events.clone())
            .with_clock(clock.clone());
        let tokens = Arc::new(AccessTokenRegistry::new(config.issuance.operator));
        let workflow =
            IssuanceWorkflow::from_config(&config, ledger.clone(), tokens.clone(), events.clone());

        tracing::debug!(administrator = %config.administrator, "deployment wired");
        Self {
            config,
            clock,
            events,
            directory,
            ledger,
            trusted,
            tokens,
            workflow,
        }
    }

    pub fn admin(&self) -> Address {
        self.config.administrator
    }

    /// Accredit `identity` with `signer` as its signing key.
    pub fn accredit(&self, identity: Address, name: &str, signer: &AttestationSigner) {
        let info = VerifierInfo::new(
            name,
            format!("did:web:{}", name.to_lowercase()),
            format!("https://{}.example", name.to_lowercase()),
            signer.address(),
        );
        if let Err(e) = self.directory.add_verifier(self.admin(), identity, info) {
            panic!("accrediting {name} failed: {e}");
        }
    }

    /// Sign an attestation-profile result for `subject` expiring `ttl` seconds from now.
    pub fn attest(
        &self,
        signer: &AttestationSigner,
        subject: Address,
        use_case: &str,
        ttl: i64,
    ) -> (VerificationResult, Vec<u8>) {
        let result = VerificationResult::attestation(
            subject,
            use_case,
            self.clock.now() + Duration::seconds(ttl),
            "asasasasasasasasasasasasasasasas",
            r#"{"test":"result"}"#,
        );
        let signature = self.sign(signer, &result);
        (result, signature)
    }

    /// Sign `result` under this deployment's domain and profile.
    pub fn sign(&self, signer: &AttestationSigner, result: &VerificationResult) -> Vec<u8> {
        let signed = result
            .typed_payload(self.ledger.profile())
            .and_then(|payload| {
                signer
                    .sign_typed(self.ledger.domain(), self.ledger.schema(), &payload)
                    .map_err(RegistryError::from)
            });
        match signed {
            Ok(signature) => signature,
            Err(e) => panic!("signing failed: {e}"),
        }
    }

    /// Sign and register in one step.
    pub fn register(
        &self,
        signer: &AttestationSigner,
        subject: Address,
        use_case: &str,
        ttl: i64,
    ) -> Result<u64, RegistryError> {
        let (result, signature) = self.attest(signer, subject, use_case, ttl);
        self.ledger.register_verification(subject, &result, &signature)
    }
}

/// A configuration with distinct administrator and operator identities.
pub fn test_config() -> RegistryConfig {
    let mut config = RegistryConfig::default();
    config.administrator = Address::repeat_byte(0xad);
    config.issuance.operator = Address::repeat_byte(0x0e);
    config.domain.verifying_contract = Address::repeat_byte(0xcc);
    config
}
