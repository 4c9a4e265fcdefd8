use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use trustreg_core::Address;

use crate::error::CryptoError;
use crate::keys::address_of;
use crate::typed_data::{signing_digest, Domain, TypedPayload, TypedSchema};

/// Length of a recoverable signature: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recovers the signing identity of a typed payload.
///
/// Pure: implementations must not touch any state. The ledger receives one
/// through injection so tests can substitute it.
pub trait SignatureRecovery: Send + Sync {
    /// Recover the address that signed `payload` under `domain` and `schema`.
    fn recover(
        &self,
        domain: &Domain,
        schema: &TypedSchema,
        payload: &TypedPayload,
        signature: &[u8],
    ) -> Result<Address, CryptoError>;
}

/// secp256k1 public-key recovery over the domain-separated digest.
#[derive(Debug, Default, Clone, Copy)]
pub struct Secp256k1Recovery;

impl SignatureRecovery for Secp256k1Recovery {
    fn recover(
        &self,
        domain: &Domain,
        schema: &TypedSchema,
        payload: &TypedPayload,
        signature: &[u8],
    ) -> Result<Address, CryptoError> {
        let digest = signing_digest(domain, schema, payload)?;
        recover_digest(&digest, signature)
    }
}

/// Recover the signing address of a 32-byte digest.
///
/// Accepts `v` as either {0, 1} or {27, 28}.
pub fn recover_digest(digest: &[u8; 32], signature: &[u8]) -> Result<Address, CryptoError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(CryptoError::InvalidSignature(format!(
            "signature must be {} bytes, got {}",
            SIGNATURE_LENGTH,
            signature.len()
        )));
    }

    let v = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        other => {
            return Err(CryptoError::InvalidSignature(format!(
                "invalid recovery byte {}",
                other
            )))
        }
    };
    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| CryptoError::InvalidSignature(format!("invalid recovery id {}", v)))?;
    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    Ok(address_of(&key))
}
