use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The states of a single-use access credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialState {
    /// Credential has been minted to its holder.
    Issued,
    /// The holder granted the workflow operator the right to consume it.
    ApprovedForConsumption,
    /// Credential has been exchanged for the off-system artifact. Final state.
    Consumed,
}

impl CredentialState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Consumed)
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issued => write!(f, "Issued"),
            Self::ApprovedForConsumption => write!(f, "ApprovedForConsumption"),
            Self::Consumed => write!(f, "Consumed"),
        }
    }
}

/// Events that trigger credential state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialEvent {
    /// Holder approves the workflow operator on the credential.
    Approve,
    /// Administrator consumes the approved credential.
    Consume,
}

/// Manages access-credential state transitions.
///
/// Valid transitions:
/// - Issued → ApprovedForConsumption (Approve)
/// - ApprovedForConsumption → Consumed (Consume)
///
/// No transition skips a step and none goes backwards.
pub struct CredentialStateMachine;

impl CredentialStateMachine {
    /// Attempt a state transition based on an event.
    /// Returns the new state on success, or an error for invalid transitions.
    pub fn transition(
        current: CredentialState,
        event: CredentialEvent,
    ) -> Result<CredentialState, CoreError> {
        let new_state = match (current, event) {
            (CredentialState::Issued, CredentialEvent::Approve) => {
                CredentialState::ApprovedForConsumption
            }
            (CredentialState::ApprovedForConsumption, CredentialEvent::Consume) => {
                CredentialState::Consumed
            }
            _ => {
                let target = match event {
                    CredentialEvent::Approve => CredentialState::ApprovedForConsumption,
                    CredentialEvent::Consume => CredentialState::Consumed,
                };
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    to: target,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "credential state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: CredentialState, event: CredentialEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
