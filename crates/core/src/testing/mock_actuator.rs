//! Mock actuator for testing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::actuator::{Actuator, ActuatorError};
use crate::sequence::{OutputKind, PerKind, Token};

/// One on/off interval observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedActivation {
    pub kind: OutputKind,
    pub started_at: Instant,
    /// `None` while the output is still on.
    pub ended_at: Option<Instant>,
}

impl RecordedActivation {
    /// How long the output was held on.
    pub fn held(&self) -> Option<Duration> {
        self.ended_at.map(|end| end.duration_since(self.started_at))
    }

    /// The token this interval corresponds to, rounded to whole milliseconds.
    pub fn token(&self) -> Option<Token> {
        self.held()
            .map(|held| Token::new(self.kind, held.as_millis() as u64))
    }
}

#[derive(Debug, Default)]
struct Recording {
    activations: Vec<RecordedActivation>,
    /// Index into `activations` of each kind's open interval.
    open: PerKind<Option<usize>>,
    max_simultaneous: usize,
    switch_calls: usize,
}

/// Mock implementation of the Actuator trait.
///
/// Provides controllable behavior for testing:
/// - Record every activation interval with its start and end instant
/// - Track the peak number of simultaneously active kinds
/// - Inject failures for specific kinds
/// - Report not-ready from the readiness probe
///
/// Timestamps come from `tokio::time`, so tests using a paused clock see
/// exact hold durations.
#[derive(Debug, Clone)]
pub struct MockActuator {
    recording: Arc<RwLock<Recording>>,
    failing: Arc<RwLock<HashSet<OutputKind>>>,
    failing_on_activate: Arc<RwLock<HashSet<OutputKind>>>,
    ready: Arc<RwLock<bool>>,
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockActuator {
    /// Create a new mock actuator.
    pub fn new() -> Self {
        Self {
            recording: Arc::new(RwLock::new(Recording::default())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            failing_on_activate: Arc::new(RwLock::new(HashSet::new())),
            ready: Arc::new(RwLock::new(true)),
        }
    }

    /// Get all recorded activations, in the order they started.
    pub async fn activations(&self) -> Vec<RecordedActivation> {
        self.recording.read().await.activations.clone()
    }

    /// Completed activations as tokens.
    pub async fn activation_tokens(&self) -> Vec<Token> {
        self.activations()
            .await
            .iter()
            .filter_map(RecordedActivation::token)
            .collect()
    }

    /// Kinds of every activation, completed or not.
    pub async fn activation_kinds(&self) -> Vec<OutputKind> {
        self.activations()
            .await
            .iter()
            .map(|activation| activation.kind)
            .collect()
    }

    /// Kinds that are switched on right now.
    pub async fn active_kinds(&self) -> Vec<OutputKind> {
        let recording = self.recording.read().await;
        recording
            .open
            .iter()
            .filter(|(_, open)| open.is_some())
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Peak number of kinds that were on at the same time.
    pub async fn max_simultaneous(&self) -> usize {
        self.recording.read().await.max_simultaneous
    }

    /// Number of `set_active` calls, including failed ones.
    pub async fn switch_calls(&self) -> usize {
        self.recording.read().await.switch_calls
    }

    /// Make every switch of `kind` fail.
    pub async fn fail_on(&self, kind: OutputKind) {
        self.failing.write().await.insert(kind);
    }

    /// Make only switching `kind` on fail. Switching it off still works, so
    /// start-up and shutdown `all_off` calls succeed.
    pub async fn fail_on_activate(&self, kind: OutputKind) {
        self.failing_on_activate.write().await.insert(kind);
    }

    /// Clear all injected failures.
    pub async fn clear_failures(&self) {
        self.failing.write().await.clear();
        self.failing_on_activate.write().await.clear();
    }

    /// Set what the readiness probe reports.
    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }
}

#[async_trait]
impl Actuator for MockActuator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn set_active(&self, kind: OutputKind, active: bool) -> Result<(), ActuatorError> {
        let mut recording = self.recording.write().await;
        recording.switch_calls += 1;

        let fails = self.failing.read().await.contains(&kind)
            || (active && self.failing_on_activate.read().await.contains(&kind));
        if fails {
            return Err(ActuatorError::switch(kind, active, "injected failure"));
        }

        let now = Instant::now();
        if active {
            if recording.open[kind].is_none() {
                let index = recording.activations.len();
                recording.activations.push(RecordedActivation {
                    kind,
                    started_at: now,
                    ended_at: None,
                });
                recording.open[kind] = Some(index);

                let lit = recording.open.iter().filter(|(_, o)| o.is_some()).count();
                recording.max_simultaneous = recording.max_simultaneous.max(lit);
            }
        } else if let Some(index) = recording.open[kind].take() {
            recording.activations[index].ended_at = Some(now);
        }

        Ok(())
    }

    async fn is_ready(&self) -> bool {
        *self.ready.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_records_hold_duration() {
        let actuator = MockActuator::new();

        actuator.set_active(OutputKind::Red, true).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        actuator.set_active(OutputKind::Red, false).await.unwrap();

        assert_eq!(
            actuator.activation_tokens().await,
            vec![Token::new(OutputKind::Red, 250)]
        );
        assert!(actuator.active_kinds().await.is_empty());
    }

    #[tokio::test]
    async fn test_tracks_overlap() {
        let actuator = MockActuator::new();

        actuator.set_active(OutputKind::Red, true).await.unwrap();
        actuator.set_active(OutputKind::Green, true).await.unwrap();
        assert_eq!(actuator.max_simultaneous().await, 2);
        assert_eq!(
            actuator.active_kinds().await,
            vec![OutputKind::Red, OutputKind::Green]
        );
    }

    #[tokio::test]
    async fn test_repeated_switches_are_idempotent() {
        let actuator = MockActuator::new();

        actuator.set_active(OutputKind::Yellow, true).await.unwrap();
        actuator.set_active(OutputKind::Yellow, true).await.unwrap();
        actuator.set_active(OutputKind::Yellow, false).await.unwrap();
        actuator.set_active(OutputKind::Yellow, false).await.unwrap();

        assert_eq!(actuator.activations().await.len(), 1);
        assert_eq!(actuator.switch_calls().await, 4);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let actuator = MockActuator::new();
        actuator.fail_on(OutputKind::Green).await;

        let err = actuator
            .set_active(OutputKind::Green, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ActuatorError::Switch { .. }));
        assert!(actuator.activations().await.is_empty());

        actuator.clear_failures().await;
        actuator.set_active(OutputKind::Green, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_activation_only_failure() {
        let actuator = MockActuator::new();
        actuator.fail_on_activate(OutputKind::Yellow).await;

        actuator.all_off().await.unwrap();
        let err = actuator
            .set_active(OutputKind::Yellow, true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ActuatorError::Switch {
                kind: OutputKind::Yellow,
                ..
            }
        ));
        actuator.set_active(OutputKind::Red, true).await.unwrap();

        actuator.clear_failures().await;
        actuator.set_active(OutputKind::Yellow, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_readiness() {
        let actuator = MockActuator::new();
        assert!(actuator.is_ready().await);

        actuator.set_ready(false).await;
        assert!(!actuator.is_ready().await);
    }
}
