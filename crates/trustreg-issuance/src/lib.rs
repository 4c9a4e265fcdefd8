//! Trustreg Issuance: single-use access credentials minted to verified
//! subjects and consumed under holder-granted approval.

pub mod error;
pub mod store;
pub mod tokens;
pub mod workflow;

pub use error::IssuanceError;
pub use store::{ContentStore, DiplomaMetadata, InMemoryContentStore};
pub use tokens::{AccessTokenRegistry, CredentialTokens};
pub use workflow::{AccessCredential, IssuanceWorkflow};
