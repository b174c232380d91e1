//! Actions and the per-state action registry.

use crate::context::{EventContext, FsmContext};
use crate::core::State;
use std::collections::HashMap;
use std::sync::Arc;

/// Decision returned by an action: where to go, and what to remember.
#[derive(Clone, Debug)]
pub struct Next {
    pub state: State,
    pub context: Option<FsmContext>,
}

impl Next {
    /// Move to `state`, keeping the current fsm context.
    pub fn to(state: impl Into<State>) -> Self {
        Next {
            state: state.into(),
            context: None,
        }
    }

    /// Replace the fsm context carried into the next state.
    pub fn with_context(mut self, context: FsmContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Shared action function.
///
/// Actions read the event from the event context and the current state from
/// the fsm context, then decide the next state. An error aborts the
/// transition and is returned to the caller unchanged.
pub type Action = Arc<dyn Fn(&EventContext, &FsmContext) -> anyhow::Result<Next> + Send + Sync>;

/// Wrap a closure as a shareable [`Action`].
pub fn action<F>(f: F) -> Action
where
    F: Fn(&EventContext, &FsmContext) -> anyhow::Result<Next> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Maps each known state to the action deciding transitions out of it.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<State, Option<Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the action for `state`; the last registration wins.
    pub fn register(&mut self, state: State, action: Action) {
        self.actions.insert(state, Some(action));
    }

    /// Make `state` known without an action.
    ///
    /// The machine may enter such a state, but processing any event while in
    /// it fails with `ActionNotFound`. An existing action is left in place.
    pub fn declare(&mut self, state: State) {
        self.actions.entry(state).or_insert(None);
    }

    pub fn exists(&self, state: &State) -> bool {
        self.actions.contains_key(state)
    }

    pub fn lookup(&self, state: &State) -> Option<&Action> {
        self.actions.get(state).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
