//! Engine error types.

use crate::context::ContextError;
use crate::core::State;
use thiserror::Error;

/// Errors returned by `init_with_state` and `process_event`.
///
/// None of these leave the engine half-updated; after an error the current
/// state and fsm context are exactly what they were before the call.
#[derive(Debug, Error)]
pub enum FsmError {
    /// The current state has no action, or the action chose an unknown state.
    #[error("action not found for state [{state}]")]
    ActionNotFound { state: State },

    #[error("invalid initial state [{0}]")]
    InvalidInitialState(State),

    /// Cancellation reported by a context, passed through as-is.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Error returned by a user action, passed through as-is.
    #[error(transparent)]
    Action(anyhow::Error),
}

impl FsmError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FsmError::Context(ContextError::Cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_errors_display_verbatim() {
        let err = FsmError::from(ContextError::Cancelled);
        assert_eq!(err.to_string(), "context canceled");
        assert!(err.is_cancelled());
    }

    #[test]
    fn action_errors_keep_their_source() {
        #[derive(Debug, Error)]
        #[error("battery low")]
        struct BatteryLow;

        let err = FsmError::Action(anyhow::Error::new(BatteryLow));
        assert_eq!(err.to_string(), "battery low");
        match err {
            FsmError::Action(inner) => assert!(inner.downcast_ref::<BatteryLow>().is_some()),
            other => panic!("Expected Action error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_initial_state_names_the_state() {
        let err = FsmError::InvalidInitialState(State::from("idle"));
        assert_eq!(err.to_string(), "invalid initial state [idle]");
    }
}
