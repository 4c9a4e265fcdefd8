use trustreg_core::{Address, CoreError, UseCase};
use trustreg_crypto::CryptoError;

/// Registry errors. Each variant is a distinct, inspectable failure cause.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("caller {caller} is not authorized to {action}")]
    Unauthorized { caller: Address, action: String },

    #[error("verifier not found: {0}")]
    VerifierNotFound(Address),

    #[error("verification {uuid} not found for use case '{use_case}'")]
    VerificationNotFound { uuid: u64, use_case: UseCase },

    #[error("contract not registered: {0}")]
    ContractNotFound(Address),

    #[error("contract already registered: {0}")]
    ContractAlreadyRegistered(Address),

    #[error("signing key {signing_key} is already bound to verifier {identity}")]
    SigningKeyInUse {
        signing_key: Address,
        identity: Address,
    },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("signer {0} is not an accredited verifier signing key")]
    UnknownSigner(Address),

    #[error("invalid verification payload: {0}")]
    InvalidPayload(String),

    #[error("verification {uuid} has expired")]
    Expired { uuid: u64 },

    #[error("verification result already expired at submission")]
    ExpiredOnSubmission,

    #[error("verification {uuid} has been revoked")]
    Revoked { uuid: u64 },

    #[error("verification {uuid} has been removed")]
    Removed { uuid: u64 },

    #[error("core error: {0}")]
    Core(CoreError),
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { caller, action } => Self::Unauthorized { caller, action },
            other => Self::Core(other),
        }
    }
}

impl From<CryptoError> for RegistryError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::SchemaMismatch { .. } => Self::InvalidPayload(err.to_string()),
            other => Self::InvalidSignature(other.to_string()),
        }
    }
}

impl RegistryError {
    /// Whether the error reports a missing identity, record or contract.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::VerifierNotFound(_)
                | Self::VerificationNotFound { .. }
                | Self::ContractNotFound(_)
        )
    }

    /// Whether the error reports a duplicate registration.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::ContractAlreadyRegistered(_) | Self::SigningKeyInUse { .. }
        )
    }
}
