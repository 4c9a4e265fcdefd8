//! Observability events.
//!
//! Components emit one event per committed state transition. Each event
//! carries every field needed to replay the transition without querying
//! storage.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::types::{Address, CredentialId, UseCase};

/// Events emitted by the directory, the ledger, the trusted contract
/// registry and the issuance workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A verifier was added or overwritten.
    VerifierAdded {
        identity: Address,
        name: String,
        did: String,
        url: String,
        signing_key: Address,
        replaced: bool,
    },

    /// An existing verifier was updated in place.
    VerifierUpdated {
        identity: Address,
        name: String,
        did: String,
        url: String,
        signing_key: Address,
    },

    /// A verifier was removed from the directory.
    VerifierRemoved { identity: Address },

    /// A verification record was registered.
    VerificationRegistered {
        uuid: u64,
        verifier: Address,
        signing_key: Address,
        subject: Address,
        use_case: UseCase,
        expiration: DateTime<Utc>,
        entry_time: DateTime<Utc>,
    },

    /// A verification record was revoked.
    VerificationRevoked {
        uuid: u64,
        use_case: UseCase,
        revoked_by: Address,
    },

    /// A verification record was removed by its subject.
    VerificationRemoved {
        uuid: u64,
        use_case: UseCase,
        subject: Address,
    },

    /// An external contract was registered.
    ContractRegistered {
        address: Address,
        name: String,
        trusted: bool,
        registered_at: DateTime<Utc>,
    },

    /// The trust flag of a registered contract was edited.
    ContractTrustEdited { address: Address, trusted: bool },

    /// A new access credential was minted.
    CredentialIssued {
        id: CredentialId,
        holder: Address,
        metadata_uri: String,
    },

    /// An access credential was consumed. Terminal.
    CredentialConsumed {
        id: CredentialId,
        holder: Address,
        operator: Address,
    },
}

impl RegistryEvent {
    /// Short event name, used as a tracing field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VerifierAdded { .. } => "verifier_added",
            Self::VerifierUpdated { .. } => "verifier_updated",
            Self::VerifierRemoved { .. } => "verifier_removed",
            Self::VerificationRegistered { .. } => "verification_registered",
            Self::VerificationRevoked { .. } => "verification_revoked",
            Self::VerificationRemoved { .. } => "verification_removed",
            Self::ContractRegistered { .. } => "contract_registered",
            Self::ContractTrustEdited { .. } => "contract_trust_edited",
            Self::CredentialIssued { .. } => "credential_issued",
            Self::CredentialConsumed { .. } => "credential_consumed",
        }
    }
}

/// Receiver of committed events.
pub trait EventSink: Send + Sync {
    /// Deliver one event. Called after the state change has been committed.
    fn emit(&self, event: RegistryEvent);
}

/// In-memory, append-only event log.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RwLock<Vec<RegistryEvent>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events in emission order.
    pub fn events(&self) -> Vec<RegistryEvent> {
        self.events.read().clone()
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<RegistryEvent> {
        self.events.read().last().cloned()
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether no event was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: RegistryEvent) {
        tracing::trace!(event = event.name(), "event emitted");
        self.events.write().push(event);
    }
}
