//! Signature verifier for verification results.
//!
//! Signers and the verification ledger agree on a domain (namespace,
//! version, chain id, verifying ledger identity) and a typed payload
//! schema. The pair is hashed into a domain-separated digest, signed with
//! a recoverable secp256k1 signature, and the ledger recovers the signing
//! address from the signature alone.

pub mod error;
pub mod hashing;
pub mod keys;
pub mod recovery;
pub mod typed_data;

pub use error::CryptoError;
pub use hashing::{hash, Hash};
pub use keys::{address_of, AttestationSigner};
pub use recovery::{recover_digest, Secp256k1Recovery, SignatureRecovery, SIGNATURE_LENGTH};
pub use typed_data::{signing_digest, Domain, FieldDef, FieldKind, TypedPayload, TypedSchema, TypedValue};
