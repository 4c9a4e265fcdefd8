//! Verification ledger.
//!
//! Records are kept in an arena indexed by `uuid - 1`; the subject and
//! verifier indices only hold uuids and can be rebuilt from the arena at
//! any time.
//!
//! Lock order: ledger state, then directory. The directory never calls
//! back into the ledger.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use trustreg_core::{
    AccessPolicy, Address, Capability, Clock, EventSink, RegistryConfig, RegistryEvent,
    SystemClock, UseCase, VerificationProfile,
};
use trustreg_crypto::{Domain, Secp256k1Recovery, SignatureRecovery, TypedSchema};

use crate::directory::VerifierDirectory;
use crate::error::RegistryError;
use crate::record::{profile_schema, VerificationRecord, VerificationResult};

/// Read-only view of verification status, as needed by downstream workflows.
pub trait VerificationStatus: Send + Sync {
    /// Whether `subject` holds a currently valid record for `use_case`.
    fn is_verified(&self, subject: &Address, use_case: &UseCase) -> bool;
}

type IndexKey = (Address, UseCase);

#[derive(Debug, Default, PartialEq)]
struct LedgerState {
    records: Vec<VerificationRecord>,
    by_subject: HashMap<IndexKey, Vec<u64>>,
    by_verifier: HashMap<IndexKey, Vec<u64>>,
}

impl LedgerState {
    fn next_uuid(&self) -> u64 {
        self.records.len() as u64 + 1
    }

    fn get(&self, uuid: u64) -> Option<&VerificationRecord> {
        let index = usize::try_from(uuid.checked_sub(1)?).ok()?;
        self.records.get(index)
    }

    fn get_mut(&mut self, uuid: u64) -> Option<&mut VerificationRecord> {
        let index = usize::try_from(uuid.checked_sub(1)?).ok()?;
        self.records.get_mut(index)
    }

    fn push(&mut self, record: VerificationRecord) {
        self.by_subject
            .entry((record.subject, record.use_case.clone()))
            .or_default()
            .push(record.uuid);
        self.by_verifier
            .entry((record.verifier, record.use_case.clone()))
            .or_default()
            .push(record.uuid);
        self.records.push(record);
    }

    fn collect(&self, uuids: Option<&Vec<u64>>) -> Vec<VerificationRecord> {
        uuids
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).cloned().collect())
            .unwrap_or_default()
    }

    /// Recompute both indices from the arena. Removed records stay in the
    /// verifier index only.
    #[cfg(test)]
    fn rebuild_indices(&mut self) {
        let mut by_subject: HashMap<IndexKey, Vec<u64>> = HashMap::new();
        let mut by_verifier: HashMap<IndexKey, Vec<u64>> = HashMap::new();
        for record in &self.records {
            if !record.removed {
                by_subject
                    .entry((record.subject, record.use_case.clone()))
                    .or_default()
                    .push(record.uuid);
            }
            by_verifier
                .entry((record.verifier, record.use_case.clone()))
                .or_default()
                .push(record.uuid);
        }
        self.by_subject = by_subject;
        self.by_verifier = by_verifier;
    }
}

/// Signature-backed store of verification records.
pub struct VerificationLedger {
    policy: AccessPolicy,
    domain: Domain,
    profile: VerificationProfile,
    schema: TypedSchema,
    directory: Arc<VerifierDirectory>,
    recovery: Arc<dyn SignatureRecovery>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    state: RwLock<LedgerState>,
}

impl VerificationLedger {
    /// Create a ledger backed by `directory`, reporting to the directory's
    /// event sink and reading the system clock.
    pub fn new(
        directory: Arc<VerifierDirectory>,
        domain: Domain,
        profile: VerificationProfile,
    ) -> Self {
        Self {
            policy: AccessPolicy::new(directory.administrator()),
            domain,
            profile,
            schema: profile_schema(profile),
            recovery: Arc::new(Secp256k1Recovery),
            clock: Arc::new(SystemClock),
            events: directory.events(),
            directory,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Create a ledger with the domain and profile of a deployment config.
    pub fn from_config(directory: Arc<VerifierDirectory>, config: &RegistryConfig) -> Self {
        Self::new(
            directory,
            Domain::from(&config.domain),
            config.verification.profile,
        )
    }

    pub fn with_recovery(mut self, recovery: Arc<dyn SignatureRecovery>) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn profile(&self) -> VerificationProfile {
        self.profile
    }

    /// The typed schema results must be signed under.
    pub fn schema(&self) -> &TypedSchema {
        &self.schema
    }

    pub fn directory(&self) -> &Arc<VerifierDirectory> {
        &self.directory
    }

    /// Register a signed verification result. Open to any caller.
    ///
    /// The record is attributed to the directory identity bound to the
    /// recovered signing key, not to `caller`.
    pub fn register_verification(
        &self,
        caller: Address,
        result: &VerificationResult,
        signature: &[u8],
    ) -> Result<u64, RegistryError> {
        let payload = result.typed_payload(self.profile)?;
        let signing_key = self
            .recovery
            .recover(&self.domain, &self.schema, &payload, signature)
            .map_err(|e| {
                tracing::warn!(caller = %caller, error = %e, "verification signature rejected");
                RegistryError::from(e)
            })?;

        let now = self.clock.now();
        if result.expiration <= now {
            return Err(RegistryError::ExpiredOnSubmission);
        }

        let mut state = self.state.write();
        let verifier = self
            .directory
            .identity_for_signing_key(&signing_key)
            .ok_or_else(|| {
                tracing::warn!(signer = %signing_key, "signer is not an accredited verifier");
                RegistryError::UnknownSigner(signing_key)
            })?;

        let uuid = state.next_uuid();
        let record = VerificationRecord {
            uuid,
            verifier,
            subject: result.subject,
            use_case: result.use_case.clone(),
            expiration: result.expiration,
            entry_time: now,
            payload: result.payload.clone(),
            revoked: false,
            removed: false,
        };
        state.push(record);
        drop(state);

        tracing::info!(
            uuid,
            verifier = %verifier,
            subject = %result.subject,
            use_case = %result.use_case,
            submitted_by = %caller,
            "verification registered"
        );
        self.events.emit(RegistryEvent::VerificationRegistered {
            uuid,
            verifier,
            signing_key,
            subject: result.subject,
            use_case: result.use_case.clone(),
            expiration: result.expiration,
            entry_time: now,
        });
        Ok(uuid)
    }

    /// Whether `subject` holds any currently valid record for `use_case`.
    pub fn is_verified(&self, subject: &Address, use_case: &UseCase) -> bool {
        let now = self.clock.now();
        let state = self.state.read();
        state
            .by_subject
            .get(&(*subject, use_case.clone()))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.get(*id))
                    .any(|record| record.is_valid_at(now))
            })
            .unwrap_or(false)
    }

    /// Fetch a record. Removed records fail with [`RegistryError::Removed`].
    pub fn get_verification(
        &self,
        uuid: u64,
        use_case: &UseCase,
    ) -> Result<VerificationRecord, RegistryError> {
        let state = self.state.read();
        let record = Self::lookup(&state, uuid, use_case)?;
        if record.removed {
            return Err(RegistryError::Removed { uuid });
        }
        Ok(record.clone())
    }

    /// Fetch a record and require it to be currently valid.
    pub fn check_verification(
        &self,
        uuid: u64,
        use_case: &UseCase,
    ) -> Result<VerificationRecord, RegistryError> {
        let record = self.get_verification(uuid, use_case)?;
        if record.revoked {
            return Err(RegistryError::Revoked { uuid });
        }
        if record.expiration <= self.clock.now() {
            return Err(RegistryError::Expired { uuid });
        }
        Ok(record)
    }

    /// Records about `subject` for `use_case`, in registration order.
    /// Removed records are not listed.
    pub fn get_verifications_for_subject(
        &self,
        subject: &Address,
        use_case: &UseCase,
    ) -> Vec<VerificationRecord> {
        let state = self.state.read();
        state.collect(state.by_subject.get(&(*subject, use_case.clone())))
    }

    /// Records attributed to `verifier` for `use_case`, in registration order.
    pub fn get_verifications_for_verifier(
        &self,
        verifier: &Address,
        use_case: &UseCase,
    ) -> Vec<VerificationRecord> {
        let state = self.state.read();
        state.collect(state.by_verifier.get(&(*verifier, use_case.clone())))
    }

    /// Number of records ever registered.
    pub fn get_verification_count(&self) -> u64 {
        self.state.read().records.len() as u64
    }

    /// Revoke a record. Allowed to the administrator, the attributed
    /// verifier identity and the signing key currently bound to it.
    /// Revoking twice is a no-op.
    pub fn revoke_verification(
        &self,
        caller: Address,
        uuid: u64,
        use_case: &UseCase,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        let verifier = Self::lookup(&state, uuid, use_case)?.verifier;
        self.policy
            .authorize(
                &caller,
                &Capability::Attest {
                    verifier,
                    signing_key: self.directory.signing_key_of(&verifier),
                },
            )
            .require()?;

        let record = state
            .get_mut(uuid)
            .ok_or_else(|| Self::not_found(uuid, use_case))?;
        if record.removed {
            return Err(RegistryError::Removed { uuid });
        }
        if record.revoked {
            tracing::debug!(uuid, "verification already revoked");
            return Ok(());
        }
        record.revoked = true;
        drop(state);

        tracing::info!(uuid, use_case = %use_case, revoked_by = %caller, "verification revoked");
        self.events.emit(RegistryEvent::VerificationRevoked {
            uuid,
            use_case: use_case.clone(),
            revoked_by: caller,
        });
        Ok(())
    }

    /// Scrub a record on behalf of its subject. The uuid slot is kept.
    pub fn remove_verification(
        &self,
        caller: Address,
        uuid: u64,
        use_case: &UseCase,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        let record = Self::lookup(&state, uuid, use_case)?;
        if record.removed {
            return Err(RegistryError::Removed { uuid });
        }
        let subject = record.subject;
        self.policy
            .authorize(&caller, &Capability::Erase { subject })
            .require()?;

        let key = (subject, use_case.clone());
        if let Some(ids) = state.by_subject.get_mut(&key) {
            ids.retain(|id| *id != uuid);
            if ids.is_empty() {
                state.by_subject.remove(&key);
            }
        }
        if let Some(record) = state.get_mut(uuid) {
            record.scrub();
        }
        drop(state);

        tracing::info!(uuid, use_case = %use_case, subject = %subject, "verification removed");
        self.events.emit(RegistryEvent::VerificationRemoved {
            uuid,
            use_case: use_case.clone(),
            subject,
        });
        Ok(())
    }

    fn lookup<'a>(
        state: &'a LedgerState,
        uuid: u64,
        use_case: &UseCase,
    ) -> Result<&'a VerificationRecord, RegistryError> {
        state
            .get(uuid)
            .filter(|record| record.use_case == *use_case)
            .ok_or_else(|| Self::not_found(uuid, use_case))
    }

    fn not_found(uuid: u64, use_case: &UseCase) -> RegistryError {
        RegistryError::VerificationNotFound {
            uuid,
            use_case: use_case.clone(),
        }
    }
}

impl VerificationStatus for VerificationLedger {
    fn is_verified(&self, subject: &Address, use_case: &UseCase) -> bool {
        VerificationLedger::is_verified(self, subject, use_case)
    }
}
