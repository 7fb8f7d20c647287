//! Trait definitions for the actuator module.

use async_trait::async_trait;

use crate::sequence::OutputKind;

use super::error::ActuatorError;

/// Something that can switch output kinds on and off.
///
/// Implementations must be idempotent: switching an already-active kind on
/// (or an inactive kind off) is not an error. Callers serialize access; the
/// dispatch engine never calls `set_active` from two workers at once.
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Returns the name of this actuator implementation.
    fn name(&self) -> &str;

    /// Drive `kind` into its active or inactive physical state.
    async fn set_active(&self, kind: OutputKind, active: bool) -> Result<(), ActuatorError>;

    /// Whether the underlying device is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Switch every kind off.
    async fn all_off(&self) -> Result<(), ActuatorError> {
        for kind in OutputKind::ALL {
            self.set_active(kind, false).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingActuator {
        calls: Mutex<Vec<(OutputKind, bool)>>,
    }

    #[async_trait]
    impl Actuator for RecordingActuator {
        fn name(&self) -> &str {
            "recording"
        }

        async fn set_active(&self, kind: OutputKind, active: bool) -> Result<(), ActuatorError> {
            self.calls.lock().unwrap().push((kind, active));
            Ok(())
        }

        async fn is_ready(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_all_off_switches_every_kind_off() {
        let actuator = RecordingActuator {
            calls: Mutex::new(Vec::new()),
        };

        actuator.all_off().await.unwrap();

        let calls = actuator.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                (OutputKind::Red, false),
                (OutputKind::Green, false),
                (OutputKind::Yellow, false),
            ]
        );
    }
}
