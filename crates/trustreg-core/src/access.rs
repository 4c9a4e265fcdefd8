//! Caller-identity authorization.
//!
//! Every mutating entry point consults [`AccessPolicy::authorize`] with the
//! capability it needs and turns the typed [`Authorization`] into a result.

use std::fmt;

use crate::error::CoreError;
use crate::types::Address;

/// A privilege a caller needs to perform a mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Administer the component (directory writes, registry writes, consumption).
    Administer,
    /// Act on behalf of a verifier: the verifier identity itself or the
    /// signing key currently bound to it. Administrators always qualify.
    Attest {
        verifier: Address,
        signing_key: Option<Address>,
    },
    /// Act as the subject of a record. Only the subject qualifies.
    Erase { subject: Address },
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Administer => write!(f, "administer"),
            Self::Attest { verifier, .. } => write!(f, "attest for verifier {}", verifier),
            Self::Erase { subject } => write!(f, "erase records of subject {}", subject),
        }
    }
}

/// Why a capability was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Administrator,
    Verifier,
    SigningKey,
    Subject,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Granted(Grant),
    Denied { caller: Address, capability: Capability },
}

impl Authorization {
    /// Whether access was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// Convert into a result, mapping a denial to [`CoreError::Unauthorized`].
    pub fn require(self) -> Result<Grant, CoreError> {
        match self {
            Self::Granted(grant) => Ok(grant),
            Self::Denied { caller, capability } => Err(CoreError::Unauthorized {
                caller,
                action: capability.to_string(),
            }),
        }
    }
}

/// Authorization policy of one component instance.
///
/// The administrator is fixed at construction and never rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    administrator: Address,
}

impl AccessPolicy {
    /// Create a policy with the given administrator.
    pub fn new(administrator: Address) -> Self {
        Self { administrator }
    }

    /// The administrator identity.
    pub fn administrator(&self) -> Address {
        self.administrator
    }

    /// Check whether `caller` holds `capability`.
    pub fn authorize(&self, caller: &Address, capability: &Capability) -> Authorization {
        let grant = match capability {
            Capability::Administer => (*caller == self.administrator).then_some(Grant::Administrator),
            Capability::Attest {
                verifier,
                signing_key,
            } => {
                if *caller == self.administrator {
                    Some(Grant::Administrator)
                } else if caller == verifier {
                    Some(Grant::Verifier)
                } else if signing_key.as_ref() == Some(caller) {
                    Some(Grant::SigningKey)
                } else {
                    None
                }
            }
            Capability::Erase { subject } => (caller == subject).then_some(Grant::Subject),
        };

        match grant {
            Some(grant) => Authorization::Granted(grant),
            None => {
                tracing::debug!(caller = %caller, capability = %capability, "authorization denied");
                Authorization::Denied {
                    caller: *caller,
                    capability: capability.clone(),
                }
            }
        }
    }
}
