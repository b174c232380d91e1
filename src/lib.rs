//! Switchyard: an embeddable finite state machine engine
//!
//! A machine is a set of states, each with one action that decides where
//! to go when an event arrives. After the action picks the next state,
//! every post-transition hook matching the move runs concurrently, and only
//! when all of them have finished does the machine commit.
//!
//! # Core Concepts
//!
//! - **State / Event**: opaque string-like tokens
//! - **Action**: `Fn(&EventContext, &FsmContext) -> anyhow::Result<Next>`
//! - **Hook**: async function run for `A -> B`, `A -> *`, `* -> B` or `* -> *`
//! - **Contexts**: immutable, cancellable carriers for per-event data and
//!   for the machine's memory across transitions
//!
//! # Example
//!
//! ```rust
//! use switchyard::builder::FsmBuilder;
//! use switchyard::context::{event_from_context, state_from_context, EventContext, FsmContext};
//! use switchyard::transition::{Endpoint, Next};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut fsm = FsmBuilder::new()
//!     .when("idle", |event: &EventContext, fsm: &FsmContext| {
//!         match event_from_context(event)?.name() {
//!             "go" => Ok(Next::to("moving")),
//!             _ => Ok(Next::to(state_from_context(fsm)?)),
//!         }
//!     })
//!     .when("moving", |event: &EventContext, fsm: &FsmContext| {
//!         match event_from_context(event)?.name() {
//!             "stop" => Ok(Next::to("idle")),
//!             _ => Ok(Next::to(state_from_context(fsm)?)),
//!         }
//!     })
//!     .register_hook(Endpoint::Any, "moving", |from, to, _ctx| async move {
//!         println!("{from} -> {to}");
//!         Ok(())
//!     })
//!     .init_with_state("idle")?;
//!
//! fsm.process_event("go", None).await?;
//! assert_eq!(fsm.current_state(), "moving");
//!
//! fsm.close();
//! assert!(fsm.process_event("stop", None).await.is_err());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod context;
pub mod core;
pub mod engine;
pub mod logging;
pub mod transition;

// Re-export commonly used types
pub use builder::FsmBuilder;
pub use context::{event_from_context, state_from_context, EventContext, FsmContext};
pub use crate::core::{Event, State};
pub use engine::{Fsm, FsmError};
pub use transition::{Endpoint, Next};
