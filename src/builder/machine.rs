//! Builder for configuring a state machine before it starts.

use crate::context::{EventContext, FsmContext};
use crate::core::{State, StateHistory};
use crate::engine::{Fsm, FsmError};
use crate::logging::{Logger, NopLogger};
use crate::transition::{hook, ActionRegistry, Endpoint, HookRegistry, Next, TransitionKey};
use std::future::Future;
use std::sync::Arc;

/// Builder for constructing state machines with a fluent API.
///
/// Set the logger first so that registrations are logged too.
pub struct FsmBuilder {
    logger: Arc<dyn Logger>,
    actions: ActionRegistry,
    hooks: HookRegistry,
    history_capacity: usize,
}

impl FsmBuilder {
    /// Create a builder with no states, no hooks and a silent logger.
    pub fn new() -> Self {
        Self {
            logger: Arc::new(NopLogger),
            actions: ActionRegistry::new(),
            hooks: HookRegistry::new(),
            history_capacity: 0,
        }
    }

    pub fn logger<L>(mut self, logger: L) -> Self
    where
        L: Logger + 'static,
    {
        self.logger = Arc::new(logger);
        self
    }

    /// Keep the last `capacity` committed transitions. Zero disables history.
    pub fn history(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Register the action deciding transitions out of `state`.
    ///
    /// Registering a state twice replaces the earlier action.
    pub fn when<F>(mut self, state: impl Into<State>, action: F) -> Self
    where
        F: Fn(&EventContext, &FsmContext) -> anyhow::Result<Next> + Send + Sync + 'static,
    {
        let state = state.into();
        self.logger
            .log_fmt(format_args!("Added an action for state [{state}]"));
        self.actions.register(state, Arc::new(action));
        self
    }

    /// Make `state` known without an action.
    pub fn declare(mut self, state: impl Into<State>) -> Self {
        self.actions.declare(state.into());
        self
    }

    /// Append a post-transition hook for `from -> to`.
    ///
    /// Either side may be [`Endpoint::Any`].
    pub fn register_hook<F, Fut>(
        mut self,
        from: impl Into<Endpoint>,
        to: impl Into<Endpoint>,
        f: F,
    ) -> Self
    where
        F: Fn(State, State, FsmContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.register(TransitionKey::new(from, to), hook(f));
        self
    }

    /// Start the machine in `state`.
    ///
    /// Fails with [`FsmError::InvalidInitialState`] unless `state` was
    /// registered with [`when`](Self::when) or [`declare`](Self::declare).
    pub fn init_with_state(self, state: impl Into<State>) -> Result<Fsm, FsmError> {
        Fsm::start(
            self.logger,
            self.actions,
            self.hooks,
            StateHistory::with_capacity(self.history_capacity),
            state.into(),
        )
    }
}

impl Default for FsmBuilder {
    fn default() -> Self {
        Self::new()
    }
}
