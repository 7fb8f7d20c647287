//! Types for the dispatch engine.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::actuator::ActuatorError;
use crate::sequence::{OutputKind, PerKind};

/// Errors that can occur while dispatching tokens.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The engine has not been started, or was stopped.
    #[error("dispatch engine is not running")]
    NotRunning,

    /// Queue capacity could not be reserved for a token.
    #[error("failed to reserve queue space for {kind} token")]
    QueueAllocation { kind: OutputKind },

    /// An order-queue tag reached the head with no token behind it.
    #[error("order queue tag for {kind} has no matching token")]
    OrphanedTag { kind: OutputKind },

    /// The actuator failed while a worker was switching its output.
    #[error("{kind} worker actuator failure: {source}")]
    Actuator {
        kind: OutputKind,
        #[source]
        source: ActuatorError,
    },
}

impl DispatchError {
    /// Whether the engine can no longer guarantee ordering or exclusivity.
    ///
    /// Everything except `NotRunning` leaves queues, turns, or physical
    /// outputs in an unknown state.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DispatchError::NotRunning)
    }
}

/// Result of dispatching one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Number of tokens activated.
    pub activations: usize,
    /// Time from first enqueue to last completion.
    pub elapsed: Duration,
}

/// Point-in-time view of the queues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Tokens waiting in each kind's output queue.
    pub pending_tokens: PerKind<usize>,
    /// Tags per kind still in the order queue.
    pub order_tags: PerKind<usize>,
    /// Kind currently holding the turn, if any.
    pub in_flight: Option<OutputKind>,
}

impl QueueSnapshot {
    /// Whether every pending token still has an order tag to claim it.
    pub fn tags_cover_tokens(&self) -> bool {
        OutputKind::ALL
            .into_iter()
            .all(|kind| self.order_tags[kind] >= self.pending_tokens[kind])
    }

    /// Total length of the order queue.
    pub fn order_len(&self) -> usize {
        self.order_tags.iter().map(|(_, n)| *n).sum()
    }

    pub fn depths(&self) -> Vec<QueueDepth> {
        OutputKind::ALL
            .into_iter()
            .map(|kind| QueueDepth {
                kind,
                pending: self.pending_tokens[kind],
                tags: self.order_tags[kind],
            })
            .collect()
    }
}

/// Depth of one kind's queues.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueueDepth {
    pub kind: OutputKind,
    pub pending: usize,
    pub tags: usize,
}

/// Current status of the dispatch engine.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineStatus {
    /// Whether the workers are running.
    pub running: bool,
    /// Per-kind queue depths.
    pub queues: Vec<QueueDepth>,
    /// Tags waiting in the order queue.
    pub order_len: usize,
    /// Kind whose turn is currently being activated.
    pub in_flight: Option<OutputKind>,
    /// Tokens of the current line not yet completed.
    pub outstanding: usize,
    /// Tokens completed since the engine was created.
    pub completed_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pending: [usize; 3], tags: [usize; 3]) -> QueueSnapshot {
        QueueSnapshot {
            pending_tokens: PerKind::from_fn(|kind| pending[kind.index()]),
            order_tags: PerKind::from_fn(|kind| tags[kind.index()]),
            in_flight: None,
        }
    }

    #[test]
    fn test_tags_cover_tokens() {
        assert!(snapshot([1, 0, 2], [1, 1, 2]).tags_cover_tokens());
        assert!(!snapshot([2, 0, 0], [1, 0, 0]).tags_cover_tokens());
    }

    #[test]
    fn test_depths_and_order_len() {
        let snap = snapshot([1, 2, 3], [1, 2, 4]);
        assert_eq!(snap.order_len(), 7);

        let depths = snap.depths();
        assert_eq!(depths.len(), 3);
        assert_eq!(
            depths[2],
            QueueDepth {
                kind: OutputKind::Yellow,
                pending: 3,
                tags: 4
            }
        );
    }

    #[test]
    fn test_fatal_classification() {
        assert!(!DispatchError::NotRunning.is_fatal());
        assert!(DispatchError::OrphanedTag {
            kind: OutputKind::Red
        }
        .is_fatal());
        assert!(DispatchError::QueueAllocation {
            kind: OutputKind::Green
        }
        .is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = DispatchError::Actuator {
            kind: OutputKind::Yellow,
            source: ActuatorError::switch(OutputKind::Yellow, false, "stuck"),
        };
        assert_eq!(
            err.to_string(),
            "yellow worker actuator failure: Failed to switch yellow off: stuck"
        );
    }

    #[test]
    fn test_engine_status_serialization() {
        let status = EngineStatus {
            running: true,
            queues: vec![QueueDepth {
                kind: OutputKind::Red,
                pending: 1,
                tags: 2,
            }],
            order_len: 2,
            in_flight: Some(OutputKind::Green),
            outstanding: 3,
            completed_total: 9,
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["running"], true);
        assert_eq!(json["queues"][0]["kind"], "red");
        assert_eq!(json["in_flight"], "green");
        assert_eq!(json["completed_total"], 9);
    }
}
