/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    SigningError(String),

    #[error("payload does not match schema {schema}: {reason}")]
    SchemaMismatch { schema: String, reason: String },
}
