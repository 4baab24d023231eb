use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of a single checkout attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
    TransportError,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("invalid checkout transition from {from:?} to {to:?}")]
pub struct CheckoutTransitionError {
    pub from: CheckoutState,
    pub to: CheckoutState,
}

impl CheckoutState {
    pub fn can_transition_to(&self, next: CheckoutState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Submitting)
                | (Self::Submitting, Self::Succeeded)
                | (Self::Submitting, Self::Failed)
                | (Self::Submitting, Self::TransportError)
                | (Self::Succeeded, Self::Submitting)
                | (Self::Failed, Self::Submitting)
                | (Self::TransportError, Self::Submitting)
        )
    }

    pub fn transition_to(&mut self, next: CheckoutState) -> Result<(), CheckoutTransitionError> {
        if self.can_transition_to(next) {
            *self = next;
            return Ok(());
        }

        Err(CheckoutTransitionError { from: *self, to: next })
    }
}

/// What the shopper sees after `submit_order`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    /// Nothing was sent.
    EmptyCart,
    Succeeded { message: String, redirect_to: String },
    Failed { message: String },
    TransportError { error: String },
}

impl CheckoutOutcome {
    pub fn state(&self) -> Option<CheckoutState> {
        match self {
            Self::EmptyCart => None,
            Self::Succeeded { .. } => Some(CheckoutState::Succeeded),
            Self::Failed { .. } => Some(CheckoutState::Failed),
            Self::TransportError { .. } => Some(CheckoutState::TransportError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CheckoutOutcome, CheckoutState};

    #[test]
    fn attempt_runs_idle_submitting_terminal() {
        let mut state = CheckoutState::Idle;

        assert!(state.transition_to(CheckoutState::Submitting).is_ok());
        assert!(state.transition_to(CheckoutState::Failed).is_ok());
        assert!(!state.can_transition_to(CheckoutState::Idle));
        assert!(state.transition_to(CheckoutState::Submitting).is_ok());
        assert!(state.transition_to(CheckoutState::Succeeded).is_ok());
    }

    #[test]
    fn cannot_skip_submitting() {
        let mut state = CheckoutState::Idle;

        let error = state.transition_to(CheckoutState::Succeeded).expect_err("must be rejected");
        assert_eq!(error.from, CheckoutState::Idle);
        assert_eq!(state, CheckoutState::Idle);

        state = CheckoutState::Failed;
        assert!(!state.can_transition_to(CheckoutState::Succeeded));
        assert!(!state.can_transition_to(CheckoutState::Idle));
    }

    #[test]
    fn outcome_maps_to_terminal_state() {
        let outcome = CheckoutOutcome::Failed { message: "Out of stock".to_owned() };

        assert_eq!(outcome.state(), Some(CheckoutState::Failed));
        assert_eq!(CheckoutOutcome::EmptyCart.state(), None);
    }
}
