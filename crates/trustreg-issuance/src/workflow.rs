//! Credential issuance workflow.
//!
//! ```text
//! Issued ──holder approves operator──▶ ApprovedForConsumption ──administrator consumes──▶ Consumed
//! ```
//!
//! Approval lives in the token collaborator; the workflow stores `Issued`
//! and `Consumed` and derives the middle state from the token's approval.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use trustreg_core::{
    AccessPolicy, Address, Capability, CredentialEvent, CredentialId, CredentialState,
    CredentialStateMachine, EventSink, RegistryConfig, RegistryEvent, UseCase,
};
use trustreg_registry::VerificationStatus;

use crate::error::IssuanceError;
use crate::store::{ContentStore, DiplomaMetadata};
use crate::tokens::CredentialTokens;

/// An issued access credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredential {
    pub id: CredentialId,
    pub holder: Address,
    pub metadata_uri: String,
    pub state: CredentialState,
}

/// Mints access credentials to verified subjects and consumes them under
/// holder-granted approval.
pub struct IssuanceWorkflow {
    policy: AccessPolicy,
    operator: Address,
    use_case: UseCase,
    status: Arc<dyn VerificationStatus>,
    tokens: Arc<dyn CredentialTokens>,
    credentials: DashMap<CredentialId, AccessCredential>,
    events: Arc<dyn EventSink>,
}

impl IssuanceWorkflow {
    /// `operator` is the identity holders approve and the token minter.
    pub fn new(
        administrator: Address,
        operator: Address,
        use_case: UseCase,
        status: Arc<dyn VerificationStatus>,
        tokens: Arc<dyn CredentialTokens>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            policy: AccessPolicy::new(administrator),
            operator,
            use_case,
            status,
            tokens,
            credentials: DashMap::new(),
            events,
        }
    }

    pub fn from_config(
        config: &RegistryConfig,
        status: Arc<dyn VerificationStatus>,
        tokens: Arc<dyn CredentialTokens>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self::new(
            config.administrator,
            config.issuance.operator,
            config.issuance.use_case.clone(),
            status,
            tokens,
            events,
        )
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    pub fn use_case(&self) -> &UseCase {
        &self.use_case
    }

    /// Mint a credential to `caller`, who must currently be verified.
    /// Every successful call mints a new, independent credential.
    pub fn accept_new_diploma_request(
        &self,
        caller: Address,
        metadata_uri: impl Into<String>,
    ) -> Result<CredentialId, IssuanceError> {
        if !self.status.is_verified(&caller, &self.use_case) {
            tracing::warn!(subject = %caller, use_case = %self.use_case, "issuance refused: not verified");
            return Err(IssuanceError::NotVerified {
                subject: caller,
                use_case: self.use_case.clone(),
            });
        }

        let metadata_uri = metadata_uri.into();
        let id = self.tokens.mint(self.operator, caller, &metadata_uri)?;
        self.credentials.insert(
            id,
            AccessCredential {
                id,
                holder: caller,
                metadata_uri: metadata_uri.clone(),
                state: CredentialState::Issued,
            },
        );

        tracing::info!(id = %id, holder = %caller, uri = %metadata_uri, "credential issued");
        self.events.emit(RegistryEvent::CredentialIssued {
            id,
            holder: caller,
            metadata_uri,
        });
        Ok(id)
    }

    /// Pin `metadata` and request a credential for the returned URI.
    pub async fn request_with_metadata(
        &self,
        caller: Address,
        metadata: &DiplomaMetadata,
        store: &dyn ContentStore,
    ) -> Result<CredentialId, IssuanceError> {
        if !self.status.is_verified(&caller, &self.use_case) {
            return Err(IssuanceError::NotVerified {
                subject: caller,
                use_case: self.use_case.clone(),
            });
        }
        let uri = store.put(&metadata.to_json()?).await?;
        self.accept_new_diploma_request(caller, uri)
    }

    /// Consume an approved credential. Administrator only; terminal.
    pub fn consume_diploma_access_token(
        &self,
        caller: Address,
        id: CredentialId,
    ) -> Result<(), IssuanceError> {
        self.policy
            .authorize(&caller, &Capability::Administer)
            .require()?;

        let mut credential = self
            .credentials
            .get_mut(&id)
            .ok_or(IssuanceError::CredentialNotFound(id))?;
        if credential.state == CredentialState::Consumed {
            return Err(IssuanceError::AlreadyConsumed(id));
        }
        if !self.tokens.is_approved_for(id, &self.operator) {
            return Err(IssuanceError::NotApproved(id));
        }

        let approved =
            CredentialStateMachine::transition(credential.state, CredentialEvent::Approve)?;
        let consumed = CredentialStateMachine::transition(approved, CredentialEvent::Consume)?;
        self.tokens.burn(self.operator, id)?;
        credential.state = consumed;
        let holder = credential.holder;
        drop(credential);

        tracing::info!(id = %id, holder = %holder, operator = %self.operator, "credential consumed");
        self.events.emit(RegistryEvent::CredentialConsumed {
            id,
            holder,
            operator: self.operator,
        });
        Ok(())
    }

    /// Current view of a credential, with approval reflected in its state.
    pub fn credential(&self, id: CredentialId) -> Result<AccessCredential, IssuanceError> {
        let mut credential = self
            .credentials
            .get(&id)
            .map(|c| c.clone())
            .ok_or(IssuanceError::CredentialNotFound(id))?;
        if credential.state == CredentialState::Issued
            && self.tokens.is_approved_for(id, &self.operator)
        {
            credential.state = CredentialState::ApprovedForConsumption;
        }
        Ok(credential)
    }

    /// Credentials issued to `holder`, ordered by id.
    pub fn credentials_of(&self, holder: &Address) -> Vec<AccessCredential> {
        let mut ids: Vec<CredentialId> = self
            .credentials
            .iter()
            .filter(|c| c.holder == *holder)
            .map(|c| c.id)
            .collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| self.credential(id).ok())
            .collect()
    }
}
