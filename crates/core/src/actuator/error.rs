//! Error types for the actuator module.

use thiserror::Error;

use crate::sequence::OutputKind;

use super::lamp::Lamp;

/// Errors raised while driving physical outputs.
#[derive(Debug, Error)]
pub enum ActuatorError {
    /// The device did not pass its readiness probe.
    #[error("Actuator {name} is not ready")]
    NotReady { name: String },

    /// Driving a single lamp channel failed.
    #[error("Failed to drive {lamp} lamp: {reason}")]
    Channel { lamp: Lamp, reason: String },

    /// Switching an output kind failed.
    #[error("Failed to switch {kind} {state}: {reason}")]
    Switch {
        kind: OutputKind,
        state: &'static str,
        reason: String,
    },
}

impl ActuatorError {
    /// Creates a switch error for `kind` going on or off.
    pub fn switch(kind: OutputKind, active: bool, reason: impl Into<String>) -> Self {
        Self::Switch {
            kind,
            state: if active { "on" } else { "off" },
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ActuatorError::switch(OutputKind::Green, true, "pin busy");
        assert_eq!(err.to_string(), "Failed to switch green on: pin busy");

        let err = ActuatorError::NotReady {
            name: "lamps".to_string(),
        };
        assert_eq!(err.to_string(), "Actuator lamps is not ready");

        let err = ActuatorError::Channel {
            lamp: Lamp::Red,
            reason: "open circuit".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to drive red lamp: open circuit");
    }
}
