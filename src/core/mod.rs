//! Core identifier and history types.
//!
//! This module contains the plain data the engine works with:
//! - `State` and `Event` tokens
//! - Bounded history of committed transitions

mod event;
mod history;
mod state;

pub use event::Event;
pub use history::{StateHistory, StateTransition};
pub use state::State;
