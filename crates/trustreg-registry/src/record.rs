//! Verification results as signed off-system, and the records the ledger
//! keeps for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use trustreg_core::{Address, UseCase, VerificationProfile};
use trustreg_crypto::{FieldKind, TypedPayload, TypedSchema, TypedValue};

use crate::error::RegistryError;

/// Name of the signed struct in both profiles.
pub const VERIFICATION_RESULT_TYPE: &str = "VerificationResult";

/// The typed schema a signer and the ledger agree on for `profile`.
///
/// Field order is part of the signature; the two sides must use the same
/// profile or recovery yields an unrelated address.
pub fn profile_schema(profile: VerificationProfile) -> TypedSchema {
    match profile {
        VerificationProfile::Attestation => TypedSchema::new(
            VERIFICATION_RESULT_TYPE,
            &[
                ("subject", FieldKind::Address),
                ("expiration", FieldKind::Uint256),
                ("signature", FieldKind::String),
                ("jsonResult", FieldKind::String),
                ("useCase", FieldKind::String),
            ],
        ),
        VerificationProfile::Schema => TypedSchema::new(
            VERIFICATION_RESULT_TYPE,
            &[
                ("schema", FieldKind::String),
                ("subject", FieldKind::Address),
                ("expiration", FieldKind::Uint256),
            ],
        ),
    }
}

/// Attested content beyond subject, use case and expiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationPayload {
    /// Result of an external check, with the checker's own signature.
    Attestation { signature: String, json_result: String },
    /// Reference to a credential schema.
    Schema { schema: String },
}

impl VerificationPayload {
    fn scrubbed(&self) -> Self {
        match self {
            Self::Attestation { .. } => Self::Attestation {
                signature: String::new(),
                json_result: String::new(),
            },
            Self::Schema { .. } => Self::Schema {
                schema: String::new(),
            },
        }
    }
}

/// A verification result as submitted to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub subject: Address,
    pub expiration: DateTime<Utc>,
    pub use_case: UseCase,
    pub payload: VerificationPayload,
}

impl VerificationResult {
    /// A result in the attestation profile.
    pub fn attestation(
        subject: Address,
        use_case: impl Into<String>,
        expiration: DateTime<Utc>,
        signature: impl Into<String>,
        json_result: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            expiration,
            use_case: UseCase::new(use_case),
            payload: VerificationPayload::Attestation {
                signature: signature.into(),
                json_result: json_result.into(),
            },
        }
    }

    /// A result in the schema profile. The schema doubles as the use case.
    pub fn schema(subject: Address, schema: impl Into<String>, expiration: DateTime<Utc>) -> Self {
        let schema = schema.into();
        Self {
            subject,
            expiration,
            use_case: UseCase::new(schema.clone()),
            payload: VerificationPayload::Schema { schema },
        }
    }

    /// Typed values signed under `profile`.
    ///
    /// The expiration is signed in whole seconds, so a fractional expiration
    /// is rejected rather than stored beyond what was signed.
    pub fn typed_payload(&self, profile: VerificationProfile) -> Result<TypedPayload, RegistryError> {
        if self.expiration.timestamp_subsec_nanos() != 0 {
            return Err(RegistryError::InvalidPayload(format!(
                "expiration {} is not a whole second",
                self.expiration
            )));
        }
        let expiration = u128::try_from(self.expiration.timestamp()).map_err(|_| {
            RegistryError::InvalidPayload(format!(
                "expiration {} precedes the unix epoch",
                self.expiration
            ))
        })?;

        match (profile, &self.payload) {
            (
                VerificationProfile::Attestation,
                VerificationPayload::Attestation {
                    signature,
                    json_result,
                },
            ) => Ok(TypedPayload::new()
                .with("subject", TypedValue::Address(self.subject))
                .with("expiration", TypedValue::Uint(expiration))
                .with("signature", TypedValue::String(signature.clone()))
                .with("jsonResult", TypedValue::String(json_result.clone()))
                .with("useCase", TypedValue::String(self.use_case.0.clone()))),
            (VerificationProfile::Schema, VerificationPayload::Schema { schema }) => {
                if schema != self.use_case.as_str() {
                    return Err(RegistryError::InvalidPayload(format!(
                        "schema '{}' does not match use case '{}'",
                        schema, self.use_case
                    )));
                }
                Ok(TypedPayload::new()
                    .with("schema", TypedValue::String(schema.clone()))
                    .with("subject", TypedValue::Address(self.subject))
                    .with("expiration", TypedValue::Uint(expiration)))
            }
            (profile, _) => Err(RegistryError::InvalidPayload(format!(
                "payload does not fit the {:?} profile",
                profile
            ))),
        }
    }
}

/// A stored verification record.
///
/// Immutable once registered except for `revoked` and `removed`, both of
/// which only ever go from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub uuid: u64,
    /// Directory identity whose signing key produced the signature.
    pub verifier: Address,
    pub subject: Address,
    pub use_case: UseCase,
    pub expiration: DateTime<Utc>,
    pub entry_time: DateTime<Utc>,
    pub payload: VerificationPayload,
    pub revoked: bool,
    pub removed: bool,
}

impl VerificationRecord {
    /// Whether the record counts as a verification at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.removed && self.expiration > now
    }

    /// Mark the record removed and clear subject and payload.
    pub(crate) fn scrub(&mut self) {
        self.removed = true;
        self.subject = Address::ZERO;
        self.payload = self.payload.scrubbed();
    }
}
