//! Signal controller: the line-by-line run loop.
//!
//! For each input line the controller:
//! - **Classifies**: diagnostic toggles are handled here and never parsed
//! - **Parses**: the line becomes an expanded token sequence
//! - **Dispatches**: the engine activates every token and the controller
//!   waits for the line to finish before reading the next one
//!
//! Any error returned from [`SignalController::run`] is unrecoverable; the
//! caller is expected to stop the controller and start a fresh one.

mod config;
mod runner;
mod types;

pub use config::ControllerConfig;
pub use runner::{DiagnosticsCallback, SignalController};
pub use types::{ControllerError, LineOutcome};
