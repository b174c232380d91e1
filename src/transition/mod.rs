//! Transition keys and post-transition hooks.
//!
//! A hook is registered against a [`TransitionKey`] whose sides are either an
//! exact state or [`Endpoint::Any`]. A concrete transition `A -> B` matches
//! four buckets, always resolved in this order:
//!
//! 1. `A -> B`
//! 2. `A -> *`
//! 3. `* -> B`
//! 4. `* -> *`

pub mod action;

pub use action::{action, Action, ActionRegistry, Next};

use crate::context::FsmContext;
use crate::core::State;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by a hook.
pub type HookFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Shared post-transition hook.
///
/// Hooks receive the source state, the decided target state, and the fsm
/// context that is about to be committed, all by value.
pub type Hook = Arc<dyn Fn(State, State, FsmContext) -> HookFuture + Send + Sync>;

/// Wrap an async closure as a shareable [`Hook`].
pub fn hook<F, Fut>(f: F) -> Hook
where
    F: Fn(State, State, FsmContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |from, to, ctx| -> HookFuture { Box::pin(f(from, to, ctx)) })
}

/// One side of a transition key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Exact(State),
    Any,
}

impl From<State> for Endpoint {
    fn from(state: State) -> Self {
        Endpoint::Exact(state)
    }
}

impl From<&State> for Endpoint {
    fn from(state: &State) -> Self {
        Endpoint::Exact(state.clone())
    }
}

impl From<&'static str> for Endpoint {
    fn from(name: &'static str) -> Self {
        Endpoint::Exact(State::from(name))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Exact(state) => fmt::Display::fmt(state, f),
            Endpoint::Any => f.write_str("*"),
        }
    }
}

/// `(from, to)` pair a hook is registered under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransitionKey {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl TransitionKey {
    pub fn new(from: impl Into<Endpoint>, to: impl Into<Endpoint>) -> Self {
        TransitionKey {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The four keys a concrete transition matches, in dispatch order.
    pub fn buckets(from: &State, to: &State) -> [TransitionKey; 4] {
        [
            TransitionKey::new(from, to),
            TransitionKey::new(from, Endpoint::Any),
            TransitionKey::new(Endpoint::Any, to),
            TransitionKey::new(Endpoint::Any, Endpoint::Any),
        ]
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Hooks matched by one transition key.
pub struct Bucket<'a> {
    pub key: TransitionKey,
    pub hooks: &'a [Hook],
}

/// Append-only registry of post-transition hooks.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<TransitionKey, Vec<Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `hook` to the list for `key`, after any earlier registrations.
    pub fn register(&mut self, key: TransitionKey, hook: Hook) {
        self.hooks.entry(key).or_default().push(hook);
    }

    /// Resolve the four buckets for `from -> to`, in dispatch order.
    ///
    /// Buckets without registrations are returned with an empty slice.
    pub fn resolve(&self, from: &State, to: &State) -> [Bucket<'_>; 4] {
        TransitionKey::buckets(from, to).map(|key| {
            let hooks = self.hooks.get(&key).map(Vec::as_slice).unwrap_or(&[]);
            Bucket { key, hooks }
        })
    }

    /// Total number of hooks `from -> to` would run.
    pub fn matching(&self, from: &State, to: &State) -> usize {
        self.resolve(from, to)
            .iter()
            .map(|bucket| bucket.hooks.len())
            .sum()
    }

    pub fn len(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
