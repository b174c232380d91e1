//! Builder API for configuring a machine.
//!
//! The builder collects actions and hooks, then
//! [`init_with_state`](FsmBuilder::init_with_state) validates the starting
//! state and hands back a running [`Fsm`](crate::engine::Fsm). There is no
//! way to process events on a machine that was never initialized.

pub mod machine;

pub use machine::FsmBuilder;
