//! Trustreg Core: fundamental types, errors, events and configuration
//! shared by the verifier directory, the verification ledger and the
//! access-credential issuance workflow.

pub mod access;
pub mod clock;
pub mod config;
pub mod credential_state;
pub mod error;
pub mod events;
pub mod telemetry;
pub mod types;

pub use access::{AccessPolicy, Authorization, Capability, Grant};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RegistryConfig, VerificationProfile};
pub use credential_state::{CredentialEvent, CredentialState, CredentialStateMachine};
pub use error::CoreError;
pub use events::{EventLog, EventSink, RegistryEvent};
pub use types::{Address, CredentialId, UseCase};
