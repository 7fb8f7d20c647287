//! Two-lamp signal bank.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::sequence::OutputKind;

use super::error::ActuatorError;
use super::traits::Actuator;

/// A physical lamp channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lamp {
    Red,
    Green,
}

impl Lamp {
    pub const ALL: [Lamp; 2] = [Lamp::Red, Lamp::Green];

    fn index(self) -> usize {
        match self {
            Lamp::Red => 0,
            Lamp::Green => 1,
        }
    }
}

impl fmt::Display for Lamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lamp::Red => f.write_str("red"),
            Lamp::Green => f.write_str("green"),
        }
    }
}

/// Lamps lit while `kind` is active.
pub fn lamp_pattern(kind: OutputKind) -> &'static [Lamp] {
    const PATTERNS: [&[Lamp]; OutputKind::COUNT] =
        [&[Lamp::Red], &[Lamp::Green], &[Lamp::Red, Lamp::Green]];
    PATTERNS[kind.index()]
}

/// Which lamps are currently lit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LampState {
    lit: [bool; 2],
}

impl LampState {
    pub fn is_lit(&self, lamp: Lamp) -> bool {
        self.lit[lamp.index()]
    }

    pub fn all_off(&self) -> bool {
        !self.lit.iter().any(|lit| *lit)
    }

    /// The output kind whose pattern exactly matches the lit lamps.
    pub fn active_kind(&self) -> Option<OutputKind> {
        OutputKind::ALL.into_iter().find(|kind| {
            let pattern = lamp_pattern(*kind);
            Lamp::ALL
                .iter()
                .all(|lamp| self.is_lit(*lamp) == pattern.contains(lamp))
        })
    }

    fn set(&mut self, lamp: Lamp, lit: bool) {
        self.lit[lamp.index()] = lit;
    }
}

/// In-process lamp bank.
///
/// Activating a kind drives every lamp to that kind's pattern, so lamps
/// belonging to other kinds are forced off first.
#[derive(Debug, Default)]
pub struct LampActuator {
    state: RwLock<LampState>,
}

impl LampActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lamp state.
    pub async fn state(&self) -> LampState {
        *self.state.read().await
    }
}

#[async_trait]
impl Actuator for LampActuator {
    fn name(&self) -> &str {
        "lamps"
    }

    async fn set_active(&self, kind: OutputKind, active: bool) -> Result<(), ActuatorError> {
        let pattern = lamp_pattern(kind);
        let mut state = self.state.write().await;

        if active {
            for lamp in Lamp::ALL {
                state.set(lamp, pattern.contains(&lamp));
            }
            info!("{} light ON", kind);
        } else {
            for lamp in pattern {
                state.set(*lamp, false);
            }
            info!("{} light OFF", kind);
        }

        debug!(state = ?*state, "Lamp state changed");
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yellow_uses_both_lamps() {
        assert_eq!(lamp_pattern(OutputKind::Yellow), &[Lamp::Red, Lamp::Green]);
        assert_eq!(lamp_pattern(OutputKind::Red), &[Lamp::Red]);
        assert_eq!(lamp_pattern(OutputKind::Green), &[Lamp::Green]);
    }

    #[tokio::test]
    async fn test_activation_forces_other_lamps_off() {
        let lamps = LampActuator::new();

        lamps.set_active(OutputKind::Yellow, true).await.unwrap();
        assert_eq!(lamps.state().await.active_kind(), Some(OutputKind::Yellow));

        // Green on while yellow is still lit: red must go dark.
        lamps.set_active(OutputKind::Green, true).await.unwrap();
        let state = lamps.state().await;
        assert!(!state.is_lit(Lamp::Red));
        assert!(state.is_lit(Lamp::Green));
        assert_eq!(state.active_kind(), Some(OutputKind::Green));
    }

    #[tokio::test]
    async fn test_deactivate_is_idempotent() {
        let lamps = LampActuator::new();

        lamps.set_active(OutputKind::Red, true).await.unwrap();
        lamps.set_active(OutputKind::Red, false).await.unwrap();
        lamps.set_active(OutputKind::Red, false).await.unwrap();

        let state = lamps.state().await;
        assert!(state.all_off());
        assert_eq!(state.active_kind(), None);
    }

    #[tokio::test]
    async fn test_all_off() {
        let lamps = LampActuator::new();
        lamps.set_active(OutputKind::Yellow, true).await.unwrap();

        lamps.all_off().await.unwrap();
        assert!(lamps.state().await.all_off());
        assert!(lamps.is_ready().await);
    }
}
