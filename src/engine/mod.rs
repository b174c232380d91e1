//! The transition engine.
//!
//! An [`Fsm`] is obtained from [`FsmBuilder::init_with_state`](crate::builder::FsmBuilder::init_with_state)
//! and owns everything one machine needs: the action and hook registries,
//! the current and initial state, the running fsm context and its cancel
//! handle.
//!
//! # Processing an event
//!
//! [`Fsm::process_event`] looks up the action for the current state, lets
//! it pick the next state, runs every matching post-transition hook
//! concurrently, and only then commits. Any failure before the commit leaves
//! the machine exactly as it was.

mod dispatch;
pub mod error;

pub use error::FsmError;

use crate::context::{first_error, CancelHandle, EventContext, FsmContext};
use crate::core::{Event, State, StateHistory, StateTransition};
use crate::logging::Logger;
use crate::transition::{hook, ActionRegistry, Endpoint, HookRegistry, Next, TransitionKey};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;

/// A running finite state machine.
///
/// `process_event` takes `&mut self`, so events on one machine are always
/// handled one at a time.
pub struct Fsm {
    logger: Arc<dyn Logger>,
    actions: ActionRegistry,
    hooks: HookRegistry,
    state: State,
    initial_state: State,
    context: FsmContext,
    cancel: CancelHandle,
    history: StateHistory,
}

impl Fsm {
    pub(crate) fn start(
        logger: Arc<dyn Logger>,
        actions: ActionRegistry,
        hooks: HookRegistry,
        history: StateHistory,
        state: State,
    ) -> Result<Self, FsmError> {
        if !actions.exists(&state) {
            return Err(FsmError::InvalidInitialState(state));
        }

        let (context, cancel) = FsmContext::background().with_cancel();
        logger.log_fmt(format_args!("Init FSM with state [{state}]"));
        Ok(Fsm {
            logger,
            actions,
            hooks,
            initial_state: state.clone(),
            state,
            context,
            cancel,
            history,
        })
    }

    /// Re-initialize the machine in `state`.
    ///
    /// A fresh running context replaces the old one, which is abandoned but
    /// not cancelled. History starts over.
    pub fn init_with_state(&mut self, state: impl Into<State>) -> Result<(), FsmError> {
        let state = state.into();
        if !self.actions.exists(&state) {
            return Err(FsmError::InvalidInitialState(state));
        }

        let (context, cancel) = FsmContext::background().with_cancel();
        self.context = context;
        self.cancel = cancel;
        self.initial_state = state.clone();
        self.state = state;
        self.history.clear();
        self.logger
            .log_fmt(format_args!("Init FSM with state [{}]", self.state));
        Ok(())
    }

    pub fn current_state(&self) -> &State {
        &self.state
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    /// The fsm context that will be handed to the next action.
    pub fn context(&self) -> &FsmContext {
        &self.context
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn exists(&self, state: &State) -> bool {
        self.actions.exists(state)
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Register or replace the action for `state`.
    pub fn when<F>(&mut self, state: impl Into<State>, action: F) -> &mut Self
    where
        F: Fn(&EventContext, &FsmContext) -> anyhow::Result<Next> + Send + Sync + 'static,
    {
        let state = state.into();
        self.logger
            .log_fmt(format_args!("Added an action for state [{state}]"));
        self.actions.register(state, Arc::new(action));
        self
    }

    /// Make `state` known without giving it an action.
    pub fn declare(&mut self, state: impl Into<State>) -> &mut Self {
        self.actions.declare(state.into());
        self
    }

    /// Append a post-transition hook for `from -> to`.
    pub fn register_hook<F, Fut>(
        &mut self,
        from: impl Into<Endpoint>,
        to: impl Into<Endpoint>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(State, State, FsmContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks.register(TransitionKey::new(from, to), hook(f));
        self
    }

    /// Feed `event` to the action of the current state.
    ///
    /// Passing `None` for `ctx` uses a fresh background context. On success
    /// the machine is in the state the action returned, with the context the
    /// action returned (or the one it was given). On error nothing changed.
    ///
    /// Must be called from within a tokio runtime; hooks run as spawned tasks.
    pub async fn process_event(
        &mut self,
        event: impl Into<Event>,
        ctx: Option<EventContext>,
    ) -> Result<(), FsmError> {
        let event = event.into();
        let span = tracing::debug_span!("process_event", event = %event, from = %self.state);
        self.transition(event, ctx).instrument(span).await
    }

    async fn transition(
        &mut self,
        event: Event,
        ctx: Option<EventContext>,
    ) -> Result<(), FsmError> {
        self.logger.log_fmt(format_args!(
            "Handling event [{event}] in state [{}]",
            self.state
        ));
        let event_ctx = ctx.unwrap_or_default().with_event(event.clone());

        let Some(action) = self.actions.lookup(&self.state).cloned() else {
            self.logger.log_fmt(format_args!(
                "No action for state [{}], event [{event}] dropped",
                self.state
            ));
            return Err(FsmError::ActionNotFound {
                state: self.state.clone(),
            });
        };

        // The carried context may not descend from the running one, so the
        // engine's own handle is checked as well.
        first_error([self.cancel.err(), self.context.err(), event_ctx.err()])?;

        let fsm_ctx = self.context.with_state(self.state.clone());
        let Next {
            state: next,
            context,
        } = action(&event_ctx, &fsm_ctx).map_err(FsmError::Action)?;
        let carried = context.unwrap_or_else(|| fsm_ctx.clone());

        first_error([event_ctx.err(), fsm_ctx.err(), carried.err()])?;

        if !self.actions.exists(&next) {
            self.logger
                .log_fmt(format_args!("Next state [{next}] is not registered"));
            return Err(FsmError::ActionNotFound { state: next });
        }

        dispatch::run_hooks(
            &self.hooks,
            &self.state,
            &next,
            &carried,
            self.logger.as_ref(),
        )
        .await;

        let from = std::mem::replace(&mut self.state, next);
        self.context = carried;
        tracing::debug!(from = %from, to = %self.state, "transition committed");
        self.history.record(StateTransition {
            from,
            to: self.state.clone(),
            event,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Cancel the running context; every later `process_event` fails.
    ///
    /// Hooks already running are left to finish. Closing twice is harmless.
    pub fn close(&self) {
        self.cancel.cancel();
        self.logger.log("FSM closed");
    }

    /// Close, then re-initialize in the initial state.
    pub fn reset(&mut self) -> Result<(), FsmError> {
        self.close();
        self.init_with_state(self.initial_state.clone())?;
        self.logger.log("FSM reset");
        Ok(())
    }
}

impl std::fmt::Debug for Fsm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fsm")
            .field("state", &self.state)
            .field("initial_state", &self.initial_state)
            .field("states", &self.actions.len())
            .field("hooks", &self.hooks.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
