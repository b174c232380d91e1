use super::{CancelHandle, Carrier, ContextError, ContextKey};
use crate::core::State;

/// The machine's memory, threaded through every transition.
///
/// Actions receive the current fsm context with the current state stamped
/// in. To change what the machine remembers, an action derives a new
/// context with [`FsmContext::with_value`] and returns it; returning none
/// keeps the one it was given.
///
/// # Example
///
/// ```rust
/// use switchyard::context::{ContextKey, FsmContext};
///
/// const VISITS: ContextKey<u32> = ContextKey::new("door.visits");
///
/// let ctx = FsmContext::background();
/// let next = ctx.with_value(VISITS, 1);
///
/// assert!(ctx.value(VISITS).is_err());
/// assert_eq!(next.value(VISITS), Ok(&1));
/// ```
#[derive(Clone, Debug)]
pub struct FsmContext {
    carrier: Carrier,
    state: Option<State>,
}

impl FsmContext {
    pub fn background() -> Self {
        FsmContext {
            carrier: Carrier::background(),
            state: None,
        }
    }

    pub fn with_value<T>(&self, key: ContextKey<T>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        FsmContext {
            carrier: self.carrier.with_value(key, value),
            state: self.state.clone(),
        }
    }

    pub fn value<T: 'static>(&self, key: ContextKey<T>) -> Result<&T, ContextError> {
        self.carrier.value(key)
    }

    /// Whether any value is stored under `name`, whatever its type.
    pub fn contains(&self, name: &str) -> bool {
        self.carrier.contains(name)
    }

    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (carrier, handle) = self.carrier.with_cancel();
        let ctx = FsmContext {
            carrier,
            state: self.state.clone(),
        };
        (ctx, handle)
    }

    pub fn err(&self) -> Result<(), ContextError> {
        self.carrier.err()
    }

    pub fn is_cancelled(&self) -> bool {
        self.err().is_err()
    }

    /// Wait until the context is cancelled.
    ///
    /// Hooks can race this against their own work to stop early once the
    /// machine is closed.
    pub async fn cancelled(&self) {
        self.carrier.cancelled().await
    }

    pub(crate) fn with_state(&self, state: State) -> Self {
        FsmContext {
            carrier: self.carrier.clone(),
            state: Some(state),
        }
    }
}

impl Default for FsmContext {
    fn default() -> Self {
        Self::background()
    }
}

/// Read the state the engine stamped before calling the action.
pub fn state_from_context(ctx: &FsmContext) -> Result<State, ContextError> {
    ctx.state.clone().ok_or(ContextError::StateNotFound)
}
