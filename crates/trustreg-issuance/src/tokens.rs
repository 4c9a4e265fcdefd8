//! Non-fungible access tokens backing issued credentials.
//!
//! The token registry owns holder approval: a holder grants one operator
//! the right to burn a specific token, and the issuance workflow only
//! observes that grant.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use trustreg_core::{AccessPolicy, Address, Capability, CredentialId};

use crate::error::IssuanceError;

/// Ownership and approval primitive for access credentials.
pub trait CredentialTokens: Send + Sync {
    /// Mint a new token to `to`. Restricted to the minter.
    fn mint(&self, caller: Address, to: Address, uri: &str) -> Result<CredentialId, IssuanceError>;

    fn owner_of(&self, id: CredentialId) -> Result<Address, IssuanceError>;

    fn token_uri(&self, id: CredentialId) -> Result<String, IssuanceError>;

    /// Approve `operator` to burn `id`. Only the holder may approve.
    fn approve(&self, caller: Address, operator: Address, id: CredentialId)
        -> Result<(), IssuanceError>;

    fn get_approved(&self, id: CredentialId) -> Result<Option<Address>, IssuanceError>;

    /// Whether `operator` may burn `id`.
    fn is_approved_for(&self, id: CredentialId, operator: &Address) -> bool;

    /// Burn a token. Only the minter may burn, and only once the holder has
    /// approved it, so a token never disappears behind the back of the
    /// workflow that consumes it.
    fn burn(&self, caller: Address, id: CredentialId) -> Result<(), IssuanceError>;
}

#[derive(Debug, Clone)]
struct Token {
    owner: Address,
    uri: String,
    approved: Option<Address>,
}

/// In-process token registry. Ids start at 1 and are never reused.
pub struct AccessTokenRegistry {
    policy: AccessPolicy,
    tokens: DashMap<CredentialId, Token>,
    next_id: AtomicU64,
}

impl AccessTokenRegistry {
    pub fn new(minter: Address) -> Self {
        Self {
            policy: AccessPolicy::new(minter),
            tokens: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn minter(&self) -> Address {
        self.policy.administrator()
    }

    /// Number of live (unburned) tokens.
    pub fn total_supply(&self) -> usize {
        self.tokens.len()
    }
}

impl CredentialTokens for AccessTokenRegistry {
    fn mint(&self, caller: Address, to: Address, uri: &str) -> Result<CredentialId, IssuanceError> {
        self.policy
            .authorize(&caller, &Capability::Administer)
            .require()?;

        let id = CredentialId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.tokens.insert(
            id,
            Token {
                owner: to,
                uri: uri.to_string(),
                approved: None,
            },
        );
        tracing::debug!(id = %id, owner = %to, "access token minted");
        Ok(id)
    }

    fn owner_of(&self, id: CredentialId) -> Result<Address, IssuanceError> {
        self.tokens
            .get(&id)
            .map(|token| token.owner)
            .ok_or(IssuanceError::CredentialNotFound(id))
    }

    fn token_uri(&self, id: CredentialId) -> Result<String, IssuanceError> {
        self.tokens
            .get(&id)
            .map(|token| token.uri.clone())
            .ok_or(IssuanceError::CredentialNotFound(id))
    }

    fn approve(
        &self,
        caller: Address,
        operator: Address,
        id: CredentialId,
    ) -> Result<(), IssuanceError> {
        let mut token = self
            .tokens
            .get_mut(&id)
            .ok_or(IssuanceError::CredentialNotFound(id))?;
        if token.owner != caller {
            return Err(IssuanceError::NotTokenOwner { caller, id });
        }
        token.approved = Some(operator);
        tracing::debug!(id = %id, operator = %operator, "access token approved");
        Ok(())
    }

    fn get_approved(&self, id: CredentialId) -> Result<Option<Address>, IssuanceError> {
        self.tokens
            .get(&id)
            .map(|token| token.approved)
            .ok_or(IssuanceError::CredentialNotFound(id))
    }

    fn is_approved_for(&self, id: CredentialId, operator: &Address) -> bool {
        self.tokens
            .get(&id)
            .map(|token| token.approved.as_ref() == Some(operator))
            .unwrap_or(false)
    }

    fn burn(&self, caller: Address, id: CredentialId) -> Result<(), IssuanceError> {
        self.policy
            .authorize(&caller, &Capability::Administer)
            .require()?;

        let burned = self
            .tokens
            .remove_if(&id, |_, token| token.approved == Some(caller));
        if burned.is_none() {
            return Err(if self.tokens.contains_key(&id) {
                IssuanceError::NotApproved(id)
            } else {
                IssuanceError::CredentialNotFound(id)
            });
        }
        tracing::debug!(id = %id, by = %caller, "access token burned");
        Ok(())
    }
}
