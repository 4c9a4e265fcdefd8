use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use trustreg_core::Address;

use crate::error::CryptoError;
use crate::hashing::hash;
use crate::recovery::SIGNATURE_LENGTH;
use crate::typed_data::{signing_digest, Domain, TypedPayload, TypedSchema};

/// Derive the account address of a secp256k1 public key: the last 20
/// bytes of the BLAKE3 hash of the uncompressed point (without its tag byte).
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = hash(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address(bytes)
}

/// Off-system signer of verification results.
///
/// Holds a secp256k1 signing key; the key is zeroized on drop by `k256`.
pub struct AttestationSigner {
    signing_key: SigningKey,
}

impl AttestationSigner {
    /// Generate a new random signer using OS-provided entropy.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a signer from a 32-byte secret scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "secret key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(bytes);
        let result = SigningKey::from_slice(&secret)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()));
        secret.zeroize();
        Ok(Self {
            signing_key: result?,
        })
    }

    /// The signing address.
    pub fn address(&self) -> Address {
        address_of(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest, producing `r || s || v` with `v` in {27, 28}.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningError(e.to_string()))?;

        let mut out = Vec::with_capacity(SIGNATURE_LENGTH);
        out.extend_from_slice(&signature.to_bytes());
        out.push(27 + recovery_id.to_byte());
        Ok(out)
    }

    /// Sign a typed payload under `domain` and `schema`.
    pub fn sign_typed(
        &self,
        domain: &Domain,
        schema: &TypedSchema,
        payload: &TypedPayload,
    ) -> Result<Vec<u8>, CryptoError> {
        let digest = signing_digest(domain, schema, payload)?;
        let signature = self.sign_digest(&digest)?;
        tracing::debug!(
            signer = %self.address(),
            primary_type = %schema.primary_type,
            "typed payload signed"
        );
        Ok(signature)
    }
}

impl std::fmt::Debug for AttestationSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
