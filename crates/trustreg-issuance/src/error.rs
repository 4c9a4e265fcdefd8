use trustreg_core::{Address, CoreError, CredentialId, UseCase};

/// Issuance workflow errors.
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    #[error("caller {caller} is not authorized to {action}")]
    Unauthorized { caller: Address, action: String },

    #[error("subject {subject} holds no valid verification for '{use_case}'")]
    NotVerified { subject: Address, use_case: UseCase },

    #[error("credential {0} has not been approved for consumption")]
    NotApproved(CredentialId),

    #[error("credential not found: {0}")]
    CredentialNotFound(CredentialId),

    #[error("credential {0} has already been consumed")]
    AlreadyConsumed(CredentialId),

    #[error("caller {caller} does not own credential {id}")]
    NotTokenOwner { caller: Address, id: CredentialId },

    #[error("content store error: {0}")]
    ContentStore(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("core error: {0}")]
    Core(CoreError),
}

impl From<CoreError> for IssuanceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { caller, action } => Self::Unauthorized { caller, action },
            other => Self::Core(other),
        }
    }
}
