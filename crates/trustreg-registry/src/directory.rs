//! Directory of accredited verifiers.
//!
//! Maps a verifier identity to its metadata and to the one signing key
//! currently authorized to attest on its behalf. Only the administrator
//! writes; there is no self-service registration.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use trustreg_core::{AccessPolicy, Address, Capability, EventSink, RegistryEvent};

use crate::error::RegistryError;

/// Metadata of an accredited verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierInfo {
    /// Display name.
    pub name: String,
    /// Decentralized identifier (e.g. "did:web:monokee.it").
    pub did: String,
    /// Profile URL.
    pub url: String,
    /// Address authorized to sign attestations for this verifier.
    pub signing_key: Address,
    /// Opaque accreditation proof.
    #[serde(default)]
    pub proof: Vec<u8>,
}

impl VerifierInfo {
    pub fn new(
        name: impl Into<String>,
        did: impl Into<String>,
        url: impl Into<String>,
        signing_key: Address,
    ) -> Self {
        Self {
            name: name.into(),
            did: did.into(),
            url: url.into(),
            signing_key,
            proof: Vec::new(),
        }
    }

    /// Attach an accreditation proof.
    pub fn with_proof(mut self, proof: Vec<u8>) -> Self {
        self.proof = proof;
        self
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    verifiers: HashMap<Address, VerifierInfo>,
    /// Reverse index: signing key → verifier identity. One identity per key.
    by_signing_key: HashMap<Address, Address>,
}

impl DirectoryState {
    fn ensure_key_free(&self, signing_key: &Address, identity: &Address) -> Result<(), RegistryError> {
        match self.by_signing_key.get(signing_key) {
            Some(bound) if bound != identity => Err(RegistryError::SigningKeyInUse {
                signing_key: *signing_key,
                identity: *bound,
            }),
            _ => Ok(()),
        }
    }

    /// Store `info` under `identity`, keeping the reverse index in step.
    /// Returns the replaced entry, if any.
    fn put(&mut self, identity: Address, info: VerifierInfo) -> Option<VerifierInfo> {
        let previous = self.verifiers.insert(identity, info.clone());
        if let Some(prev) = &previous {
            self.by_signing_key.remove(&prev.signing_key);
        }
        self.by_signing_key.insert(info.signing_key, identity);
        previous
    }
}

/// Administrator-managed verifier directory.
pub struct VerifierDirectory {
    policy: AccessPolicy,
    state: RwLock<DirectoryState>,
    events: Arc<dyn EventSink>,
}

impl VerifierDirectory {
    /// Create an empty directory administered by `administrator`.
    pub fn new(administrator: Address, events: Arc<dyn EventSink>) -> Self {
        Self {
            policy: AccessPolicy::new(administrator),
            state: RwLock::new(DirectoryState::default()),
            events,
        }
    }

    /// The directory administrator.
    pub fn administrator(&self) -> Address {
        self.policy.administrator()
    }

    /// The sink this directory reports to.
    pub fn events(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.events)
    }

    /// Add a verifier, overwriting any existing entry for `identity`.
    pub fn add_verifier(
        &self,
        caller: Address,
        identity: Address,
        info: VerifierInfo,
    ) -> Result<(), RegistryError> {
        self.policy
            .authorize(&caller, &Capability::Administer)
            .require()?;

        let mut state = self.state.write();
        state.ensure_key_free(&info.signing_key, &identity)?;
        let replaced = state.put(identity, info.clone()).is_some();
        let count = state.verifiers.len();
        drop(state);

        tracing::info!(
            identity = %identity,
            signing_key = %info.signing_key,
            replaced,
            count,
            "verifier added"
        );
        self.events.emit(RegistryEvent::VerifierAdded {
            identity,
            name: info.name,
            did: info.did,
            url: info.url,
            signing_key: info.signing_key,
            replaced,
        });
        Ok(())
    }

    /// Replace the metadata (and possibly the signing key) of an existing verifier.
    pub fn update_verifier(
        &self,
        caller: Address,
        identity: Address,
        info: VerifierInfo,
    ) -> Result<(), RegistryError> {
        self.policy
            .authorize(&caller, &Capability::Administer)
            .require()?;

        let mut state = self.state.write();
        if !state.verifiers.contains_key(&identity) {
            return Err(RegistryError::VerifierNotFound(identity));
        }
        state.ensure_key_free(&info.signing_key, &identity)?;
        state.put(identity, info.clone());
        drop(state);

        tracing::info!(identity = %identity, signing_key = %info.signing_key, "verifier updated");
        self.events.emit(RegistryEvent::VerifierUpdated {
            identity,
            name: info.name,
            did: info.did,
            url: info.url,
            signing_key: info.signing_key,
        });
        Ok(())
    }

    /// Remove a verifier. Its signing key stops being accepted immediately.
    pub fn remove_verifier(&self, caller: Address, identity: Address) -> Result<(), RegistryError> {
        self.policy
            .authorize(&caller, &Capability::Administer)
            .require()?;

        let mut state = self.state.write();
        let removed = state
            .verifiers
            .remove(&identity)
            .ok_or(RegistryError::VerifierNotFound(identity))?;
        state.by_signing_key.remove(&removed.signing_key);
        let count = state.verifiers.len();
        drop(state);

        tracing::info!(identity = %identity, count, "verifier removed");
        self.events
            .emit(RegistryEvent::VerifierRemoved { identity });
        Ok(())
    }

    /// Whether `identity` is a registered verifier.
    pub fn is_verifier(&self, identity: &Address) -> bool {
        self.state.read().verifiers.contains_key(identity)
    }

    /// Metadata of a registered verifier.
    pub fn get_verifier(&self, identity: &Address) -> Result<VerifierInfo, RegistryError> {
        self.state
            .read()
            .verifiers
            .get(identity)
            .cloned()
            .ok_or(RegistryError::VerifierNotFound(*identity))
    }

    /// Number of registered verifiers.
    pub fn get_verifier_count(&self) -> usize {
        self.state.read().verifiers.len()
    }

    /// The verifier identity currently bound to `signing_key`, if any.
    pub fn identity_for_signing_key(&self, signing_key: &Address) -> Option<Address> {
        self.state.read().by_signing_key.get(signing_key).copied()
    }

    /// The signing key currently bound to `identity`, if registered.
    pub fn signing_key_of(&self, identity: &Address) -> Option<Address> {
        self.state
            .read()
            .verifiers
            .get(identity)
            .map(|info| info.signing_key)
    }
}
