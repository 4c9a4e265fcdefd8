//! Trustreg Registry
//!
//! Accredited verifier directory, signature-backed
//! verification ledger and the trusted contract allow-list.

pub mod directory;
pub mod error;
pub mod ledger;
pub mod record;
pub mod trusted;

pub use directory::{VerifierDirectory, VerifierInfo};
pub use error::RegistryError;
pub use ledger::{VerificationLedger, VerificationStatus};
pub use record::{profile_schema, VerificationPayload, VerificationRecord, VerificationResult};
pub use trusted::{TrustedContractEntry, TrustedContractRegistry};
