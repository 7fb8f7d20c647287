//! Ordering and dispatch engine.
//!
//! Tokens fan out to one worker task per output kind, while a single global
//! order queue decides whose turn it is:
//! - **Enqueue**: the engine pushes each token onto its kind's queue and its
//!   tag onto the order queue under one lock
//! - **Turn**: a worker may only take a token when its tag is at the head of
//!   the order queue and no other turn is in flight
//! - **Activation**: the activation lock keeps physical outputs exclusive
//! - **Barrier**: the engine waits for every token of a line to complete
//!   before it accepts the next line

mod engine;
mod state;
mod types;
mod worker;

pub use engine::DispatchEngine;
pub use state::DispatchState;
pub use types::{DispatchError, DispatchReport, EngineStatus, QueueDepth, QueueSnapshot};
