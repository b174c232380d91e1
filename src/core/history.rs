//! Committed transition history.
//!
//! The engine appends one record per committed transition. History is
//! bounded: once the capacity is reached the oldest record is dropped.

use super::{Event, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{Event, State, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: State::from("idle"),
///     to: State::from("moving"),
///     event: Event::from("go"),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, "moving");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being transitioned from
    pub from: State,
    /// The state being transitioned to
    pub to: State,
    /// The event that triggered the transition
    pub event: Event,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of committed transitions.
///
/// A capacity of zero disables recording entirely.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{Event, State, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_capacity(8);
/// history.record(StateTransition {
///     from: State::from("idle"),
///     to: State::from("moving"),
///     event: Event::from("go"),
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 2); // idle -> moving
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateHistory {
    capacity: usize,
    transitions: VecDeque<StateTransition>,
}

impl StateHistory {
    /// Create a history that disables recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history holding at most `capacity` transitions.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity.min(64)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a transition, evicting the oldest one when full.
    pub fn record(&mut self, transition: StateTransition) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Drop all recorded transitions, keeping the capacity.
    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    /// Get the sequence of visited states, oldest first.
    pub fn get_path(&self) -> Vec<&State> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> impl ExactSizeIterator<Item = &StateTransition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
