//! Types for the signal controller.

use thiserror::Error;

use crate::actuator::ActuatorError;
use crate::dispatch::DispatchError;
use crate::line::LineSourceError;
use crate::sequence::SequenceError;

/// Errors that stop the controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The actuator failed its readiness probe or its initial switch-off.
    #[error("actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    /// A line carried an out-of-range repeat count.
    #[error("rejected sequence: {0}")]
    Sequence(#[from] SequenceError),

    /// The dispatch engine failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// The line source failed.
    #[error("input error: {0}")]
    Source(#[from] LineSourceError),
}

impl ControllerError {
    /// Whether the controller must be restarted.
    ///
    /// Only dispatching before `start` is a usage error rather than a fault.
    pub fn is_fatal(&self) -> bool {
        match self {
            ControllerError::Dispatch(e) => e.is_fatal(),
            _ => true,
        }
    }
}

/// What handling one line did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line.
    Ignored,
    /// Diagnostic verbosity switched to the given state.
    DiagnosticsToggled(bool),
    /// The line was parsed and every token activated.
    Dispatched {
        activations: usize,
        diagnostics: usize,
    },
}
