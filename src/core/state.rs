//! State identifiers.
//!
//! A state is an opaque, comparable token naming one node of the machine.
//! States carry no ordering and no behavior of their own; the action
//! registered for a state decides where the machine goes next.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Opaque identifier for a state machine node.
///
/// States are cheap to clone, hashable, and serialize as plain strings.
///
/// # Example
///
/// ```rust
/// use switchyard::core::State;
///
/// const IDLE: State = State::from_static("idle");
///
/// let moving = State::from("moving");
/// assert_ne!(IDLE, moving);
/// assert_eq!(IDLE.name(), "idle");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Cow<'static, str>);

impl State {
    /// Create a state from a static name, usable in `const` items.
    pub const fn from_static(name: &'static str) -> Self {
        State(Cow::Borrowed(name))
    }

    /// Get the state's name for display/logging.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for State {
    fn from(name: &'static str) -> Self {
        State::from_static(name)
    }
}

impl From<String> for State {
    fn from(name: String) -> Self {
        State(Cow::Owned(name))
    }
}

impl From<&State> for State {
    fn from(state: &State) -> Self {
        state.clone()
    }
}

impl PartialEq<str> for State {
    fn eq(&self, other: &str) -> bool {
        self.name() == other
    }
}

impl PartialEq<&str> for State {
    fn eq(&self, other: &&str) -> bool {
        self.name() == *other
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
