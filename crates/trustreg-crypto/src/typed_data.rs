//! Domain-separated structured hashing of typed payloads.
//!
//! ```text
//! typeHash     = H("Name(type1 field1,type2 field2,...)")
//! structHash   = H(typeHash || enc(value1) || enc(value2) || ...)
//! separator    = structHash of the domain under DOMAIN_TYPE
//! digest       = H(0x19 || 0x01 || separator || structHash)
//! ```
//!
//! Every encoded value is 32 bytes: addresses are left-padded, unsigned
//! integers big-endian, strings and bytes are replaced by their hash.

use serde::{Deserialize, Serialize};
use std::fmt;

use trustreg_core::config::DomainConfig;
use trustreg_core::Address;

use crate::error::CryptoError;
use crate::hashing::{hash, hash_concat, Hash};

const DOMAIN_TYPE: &str =
    "Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Prefix of the final digest, keeps it disjoint from any struct hash input.
const DIGEST_PREFIX: [u8; 2] = [0x19, 0x01];

/// Signing domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Human-readable namespace.
    pub name: String,
    /// Version of the payload schema.
    pub version: String,
    /// Network / chain identifier.
    pub chain_id: u64,
    /// Identity of the verifying ledger instance.
    pub verifying_contract: Address,
}

impl Domain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }

    /// The domain separator.
    pub fn separator(&self) -> Hash {
        hash_concat(&[
            &hash(DOMAIN_TYPE.as_bytes())[..],
            &hash(self.name.as_bytes())[..],
            &hash(self.version.as_bytes())[..],
            &TypedValue::Uint(self.chain_id as u128).encode()[..],
            &TypedValue::Address(self.verifying_contract).encode()[..],
        ])
    }
}

impl From<&DomainConfig> for Domain {
    fn from(config: &DomainConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.version.clone(),
            config.chain_id,
            config.verifying_contract,
        )
    }
}

/// Type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Address,
    Uint256,
    String,
    Bytes,
}

impl FieldKind {
    /// Canonical type name used in the type string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Uint256 => "uint256",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// One named, typed field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

/// An ordered record type. Field order is part of the signed type string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedSchema {
    /// Name of the struct type (e.g. "VerificationResult").
    pub primary_type: String,
    /// Fields in signing order.
    pub fields: Vec<FieldDef>,
}

impl TypedSchema {
    /// Build a schema from `(name, kind)` pairs.
    pub fn new(primary_type: impl Into<String>, fields: &[(&str, FieldKind)]) -> Self {
        Self {
            primary_type: primary_type.into(),
            fields: fields
                .iter()
                .map(|(name, kind)| FieldDef {
                    name: (*name).to_string(),
                    kind: *kind,
                })
                .collect(),
        }
    }

    /// The canonical type string, e.g. `VerificationResult(address subject,uint256 expiration)`.
    pub fn encode_type(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{} {}", f.kind, f.name))
            .collect();
        format!("{}({})", self.primary_type, fields.join(","))
    }

    /// Hash of the type string.
    pub fn type_hash(&self) -> Hash {
        hash(self.encode_type().as_bytes())
    }

    /// Hash of `payload` under this schema.
    ///
    /// The payload must provide exactly the schema's fields with matching kinds.
    pub fn struct_hash(&self, payload: &TypedPayload) -> Result<Hash, CryptoError> {
        if payload.len() != self.fields.len() {
            return Err(self.mismatch(format!(
                "expected {} fields, got {}",
                self.fields.len(),
                payload.len()
            )));
        }

        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.type_hash());
        for field in &self.fields {
            let value = payload
                .get(&field.name)
                .ok_or_else(|| self.mismatch(format!("missing field '{}'", field.name)))?;
            if value.kind() != field.kind {
                return Err(self.mismatch(format!(
                    "field '{}' expects {}, got {}",
                    field.name,
                    field.kind,
                    value.kind()
                )));
            }
            hasher.update(&value.encode());
        }
        Ok(*hasher.finalize().as_bytes())
    }

    fn mismatch(&self, reason: String) -> CryptoError {
        CryptoError::SchemaMismatch {
            schema: self.primary_type.clone(),
            reason,
        }
    }
}

/// A single typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypedValue {
    Address(Address),
    Uint(u128),
    String(String),
    Bytes(Vec<u8>),
}

impl TypedValue {
    /// The field kind this value satisfies.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Address(_) => FieldKind::Address,
            Self::Uint(_) => FieldKind::Uint256,
            Self::String(_) => FieldKind::String,
            Self::Bytes(_) => FieldKind::Bytes,
        }
    }

    /// 32-byte encoding of the value.
    pub fn encode(&self) -> Hash {
        match self {
            Self::Address(addr) => {
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(addr.as_bytes());
                word
            }
            Self::Uint(n) => {
                let mut word = [0u8; 32];
                word[16..].copy_from_slice(&n.to_be_bytes());
                word
            }
            Self::String(s) => hash(s.as_bytes()),
            Self::Bytes(b) => hash(b),
        }
    }
}

/// Named values of one payload instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedPayload {
    values: Vec<(String, TypedValue)>,
}

impl TypedPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a named value.
    pub fn with(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((name, value)),
        }
        self
    }

    /// Look up a value by field name.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The digest a signer signs and the ledger recovers from.
pub fn signing_digest(
    domain: &Domain,
    schema: &TypedSchema,
    payload: &TypedPayload,
) -> Result<Hash, CryptoError> {
    let struct_hash = schema.struct_hash(payload)?;
    Ok(hash_concat(&[
        &DIGEST_PREFIX[..],
        &domain.separator()[..],
        &struct_hash[..],
    ]))
}
