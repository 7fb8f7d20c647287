//! Per-kind worker task.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, trace};

use crate::actuator::Actuator;
use crate::sequence::{OutputKind, Token};

use super::state::DispatchState;
use super::types::DispatchError;

#[derive(Debug)]
enum Phase {
    /// Waiting for a token in this kind's queue.
    WaitWork,
    /// Waiting for this kind's tag to reach the order queue head.
    WaitTurn,
    Activate(Token),
    /// Release the turn and count the token as done.
    Signal(Token),
}

/// Turns one output kind's tokens into physical activations.
pub(crate) struct Worker {
    kind: OutputKind,
    state: Arc<DispatchState>,
    actuator: Arc<dyn Actuator>,
    fatal_tx: mpsc::UnboundedSender<DispatchError>,
}

impl Worker {
    pub(crate) fn new(
        kind: OutputKind,
        state: Arc<DispatchState>,
        actuator: Arc<dyn Actuator>,
        fatal_tx: mpsc::UnboundedSender<DispatchError>,
    ) -> Self {
        Self {
            kind,
            state,
            actuator,
            fatal_tx,
        }
    }

    /// Run until shutdown, or until an unrecoverable error is reported.
    pub(crate) async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        debug!("{} worker started", self.kind);

        let failure = tokio::select! {
            _ = shutdown_rx.recv() => None,
            error = self.drive() => Some(error),
        };

        match failure {
            Some(error) => {
                error!("{} worker failed: {}", self.kind, error);
                let _ = self.fatal_tx.send(error);
            }
            None => debug!("{} worker stopped", self.kind),
        }
    }

    /// The worker loop. Only returns on failure.
    async fn drive(&self) -> DispatchError {
        let mut phase = Phase::WaitWork;
        loop {
            phase = match self.step(phase).await {
                Ok(next) => next,
                Err(error) => return error,
            };
        }
    }

    async fn step(&self, phase: Phase) -> Result<Phase, DispatchError> {
        match phase {
            Phase::WaitWork => {
                self.state.wait_for_work(self.kind).await;
                Ok(Phase::WaitTurn)
            }
            Phase::WaitTurn => {
                let token = self.state.take_turn(self.kind).await?;
                Ok(Phase::Activate(token))
            }
            Phase::Activate(token) => {
                self.activate(&token).await?;
                Ok(Phase::Signal(token))
            }
            Phase::Signal(token) => {
                self.state.finish_turn(self.kind).await;
                self.state.complete_one().await;
                trace!(%token, "Token completed");
                Ok(Phase::WaitWork)
            }
        }
    }

    async fn activate(&self, token: &Token) -> Result<(), DispatchError> {
        let _guard = self.state.lock_activation().await;

        self.switch(true).await?;
        debug!("{} ON for {} ms", self.kind, token.duration_ms);
        tokio::time::sleep(token.duration()).await;
        self.switch(false).await?;
        debug!("{} OFF", self.kind);

        Ok(())
    }

    async fn switch(&self, active: bool) -> Result<(), DispatchError> {
        self.actuator
            .set_active(self.kind, active)
            .await
            .map_err(|source| DispatchError::Actuator {
                kind: self.kind,
                source,
            })
    }
}
